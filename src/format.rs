/// Renders a byte count as whole KB, MB or GB, truncating at each step.
/// Counts under 1 KiB other than zero come out as `"0 KB"`.
pub fn format_size(bytes: u32) -> String {
    if bytes == 0 {
        return "0".to_string();
    }
    let kb = bytes / 1024;
    if kb < 1024 {
        return format!("{kb} KB");
    }
    let mb = kb / 1024;
    if mb < 1024 {
        return format!("{mb} MB");
    }
    format!("{} GB", mb / 1024)
}
