//! Canned placeholder dataset served for roster, task, role and description
//! reads when no workspace is selected yet. The latest-assignment read never
//! falls back here; stale or invented duty data must fail loudly instead.

pub fn placeholder_students() -> Vec<String> {
    [
        "Nguyễn Văn A",
        "Trần Thị B",
        "Lê Văn C",
        "Phạm Thị D",
        "Hoàng Văn E",
        "Đỗ Thị F",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn placeholder_tasks() -> Vec<(String, i64)> {
    [
        ("Quét lớp", 2),
        ("Lau bảng", 1),
        ("Kê bàn ghế", 2),
    ]
    .iter()
    .map(|(name, count)| (name.to_string(), *count))
    .collect()
}

pub fn placeholder_fixed_roles() -> Vec<String> {
    [
        "Lớp trưởng (LT – Lê Vy)",
        "Lớp phó học tập (LP – Kim Anh)",
        "Tổ trưởng tổ 1 (TT1 – Quân)",
        "Tổ phó tổ 1 (TP1 – Sơn)",
        "Tổ trưởng tổ 2 (TT2 – Trường)",
        "Tổ phó tổ 2 (TP2 – Hân)",
        "Tổ trưởng tổ 3 (TT3 – Chí Anh)",
        "Tổ phó tổ 3 (TP3 – Dũng)",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn placeholder_descriptions() -> Vec<(String, Vec<String>)> {
    [
        (
            "Quét lớp",
            &[
                "Quét sạch bụi sàn nhà",
                "Hốt rác đổ đúng nơi quy định",
                "Sắp xếp lại chổi sau khi quét",
            ][..],
        ),
        (
            "Lau bảng",
            &[
                "Giặt khăn lau sạch sẽ",
                "Lau bảng sạch phấn",
                "Thay nước chậu giặt khăn",
            ][..],
        ),
        (
            "Kê bàn ghế",
            &["Kê lại bàn ghế cho thẳng hàng", "Nhặt rác trong ngăn bàn"][..],
        ),
        (
            "Trực nhật",
            &[
                "Kiểm tra điện, quạt trước khi ra về",
                "Đóng cửa sổ nếu trời mưa",
            ][..],
        ),
        ("Lớp trưởng", &["Quản lý chung", "Báo cáo sĩ số đầu giờ"][..]),
        ("Tổ trưởng", &["Thu bài tập tổ viên", "Nhắc nhở trật tự"][..]),
    ]
    .iter()
    .map(|(name, lines)| {
        (
            name.to_string(),
            lines.iter().map(|l| l.to_string()).collect(),
        )
    })
    .collect()
}
