use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// A student inside one assignment run. The id is assignment-local (position
/// in the shuffled order); the name string is the durable identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Student {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct TaskRequirement {
    pub name: String,
    pub required_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub task_name: String,
    pub students: Vec<Student>,
}

/// Randomly partition the roster across the requirements, in requirement
/// order. Earlier tasks have priority claim when the roster runs short; a
/// requirement of zero is never emitted. Pure apart from the RNG.
pub fn partition<R: Rng>(
    roster: &[String],
    requirements: &[TaskRequirement],
    rng: &mut R,
) -> Vec<Assignment> {
    let mut shuffled: Vec<&String> = roster.iter().collect();
    shuffled.shuffle(rng);

    let students: Vec<Student> = shuffled
        .into_iter()
        .enumerate()
        .map(|(i, name)| Student {
            id: format!("s-{}", i),
            name: name.clone(),
        })
        .collect();

    let mut assignments = Vec::new();
    let mut cursor = 0usize;

    for req in requirements {
        if req.required_count == 0 {
            continue;
        }
        let end = (cursor + req.required_count).min(students.len());
        let taken = students[cursor..end].to_vec();
        cursor = end;
        assignments.push(Assignment {
            task_name: req.name.clone(),
            students: taken,
        });
    }

    assignments
}
