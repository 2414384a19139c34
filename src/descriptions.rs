/// Best-effort lookup of description lines for a task label.
///
/// Exact key match (case-insensitive) wins outright. Otherwise a substring
/// match in either direction is accepted — duty labels often decorate a bare
/// key ("Lớp trưởng (LT – Vy)" vs key "Lớp trưởng"). When several keys
/// substring-match, the longest key wins; input order breaks remaining ties.
pub fn resolve_description(task_name: &str, entries: &[(String, Vec<String>)]) -> Vec<String> {
    let needle = task_name.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    for (key, lines) in entries {
        if key.trim().to_lowercase() == needle {
            return lines.clone();
        }
    }

    let mut best: Option<(&(String, Vec<String>), usize)> = None;
    for entry in entries {
        let key_norm = entry.0.trim().to_lowercase();
        if key_norm.is_empty() {
            continue;
        }
        if needle.contains(&key_norm) || key_norm.contains(&needle) {
            let len = key_norm.chars().count();
            let better = match best {
                Some((_, best_len)) => len > best_len,
                None => true,
            };
            if better {
                best = Some((entry, len));
            }
        }
    }

    best.map(|(entry, _)| entry.1.clone()).unwrap_or_default()
}
