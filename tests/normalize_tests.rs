use logtriage::normalize::{normalize, MAX_KEY_CHARS};

#[test]
fn message_without_volatile_parts_is_unchanged() {
    let msg = "Error: division by zero in calculation";
    assert_eq!(normalize(msg), msg);
}

#[test]
fn uuid_inside_path_collapses_into_path_token() {
    let msg = "File not found: /data/transactions-a1b2c3d4-e5f6-7890-abcd-ef1234567890.csv";
    assert_eq!(normalize(msg), "File not found: <PATH>");
}

#[test]
fn bare_uuid_becomes_uuid_token() {
    let msg = "job A1B2C3D4-E5F6-7890-ABCD-EF1234567890 failed";
    assert_eq!(normalize(msg), "job <UUID> failed");
}

#[test]
fn long_numeric_ids_are_masked_short_numbers_kept() {
    assert_eq!(normalize("order 1234567 rejected, retry 3"), "order <ID> rejected, retry 3");
    assert_eq!(normalize("port 8080 busy"), "port 8080 busy");
    assert_eq!(normalize("user12345 locked"), "user12345 locked");
}

#[test]
fn timestamps_are_masked_with_either_separator() {
    assert_eq!(normalize("at 2024-01-15T10:30:00 retrying"), "at <TIMESTAMP> retrying");
    assert_eq!(normalize("at 2024-01-15 10:30:00 retrying"), "at <TIMESTAMP> retrying");
}

#[test]
fn posix_and_drive_paths_are_masked() {
    assert_eq!(normalize("cannot open /var/log/app/error.log"), "cannot open <PATH>");
    assert_eq!(normalize(r"cannot open C:\Users\svc\report.txt now"), "cannot open <PATH> now");
}

#[test]
fn single_segment_is_not_a_path() {
    assert_eq!(normalize("read/write mismatch"), "read/write mismatch");
    assert_eq!(normalize("GET /health"), "GET /health");
}

#[test]
fn messages_differing_only_in_ids_share_a_key() {
    let a = normalize("payment 9876543 for 3f2b8c1e-0d4a-4b7e-9c6f-1a2b3c4d5e6f timed out at 2024-03-01T00:00:01");
    let b = normalize("payment 1234567 for 0a0b0c0d-1111-2222-3333-444455556666 timed out at 2024-03-02T12:59:59");
    assert_eq!(a, b);
    assert_eq!(a, "payment <ID> for <UUID> timed out at <TIMESTAMP>");
}

#[test]
fn keys_are_bounded() {
    let msg = "word ".repeat(100);
    let key = normalize(&msg);
    assert_eq!(key.chars().count(), MAX_KEY_CHARS);
    let wide = "é".repeat(300);
    assert_eq!(normalize(&wide).chars().count(), MAX_KEY_CHARS);
}

#[test]
fn normalization_is_a_fixed_point() {
    let msgs = [
        "File not found: /data/transactions-a1b2c3d4-e5f6-7890-abcd-ef1234567890.csv",
        "payment 9876543 for 3f2b8c1e-0d4a-4b7e-9c6f-1a2b3c4d5e6f",
        "/logs/2024-01-15T10:00:00/x.log rotated",
        "a12345/x/y and /x/y.12345",
        r"D:\data\123456\in.csv missing",
        r"code 12345C:\data\in.csv missing",
        "https://example.com/api/v1/items/99999 returned 500",
        "and/or",
        "",
    ];
    for m in msgs {
        let once = normalize(m);
        assert_eq!(normalize(&once), once, "input: {m}");
    }
    let long = format!("{}{}", "x ".repeat(98), "987654321 tail");
    let once = normalize(&long);
    assert_eq!(normalize(&once), once);
}

#[test]
fn digits_glued_to_drive_path_become_an_id() {
    assert_eq!(normalize(r"code 12345C:\data\in.csv missing"), "code <ID><PATH> missing");
}
