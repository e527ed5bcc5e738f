const UNITS: [&str; 9] = [
    "Bytes", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB", "YiB",
];

/// Human-readable binary size with two decimals, trailing zeros dropped.
pub fn format_bytes(bytes: u64) -> String {
    format_bytes_with(bytes, 2)
}

/// Like [`format_bytes`] with an explicit number of decimals.
pub fn format_bytes_with(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scale: u64 = 1;
    while unit + 1 < UNITS.len() {
        match scale.checked_mul(1024) {
            Some(next) if bytes >= next => {
                scale = next;
                unit += 1;
            }
            _ => break,
        }
    }

    let scaled = bytes as f64 / scale as f64;
    format!("{} {}", trim_decimals(scaled, decimals), UNITS[unit])
}

fn trim_decimals(value: f64, decimals: usize) -> String {
    let fixed = format!("{value:.decimals$}");
    if !fixed.contains('.') {
        return fixed;
    }
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}
