use rand::Rng;

/// Random `#RRGGBB` color with every channel in 16..=255, so each channel
/// always renders as two uppercase hex digits.
pub fn random_tag_color() -> String {
    let mut rng = rand::rng();
    let [r, g, b]: [u8; 3] = std::array::from_fn(|_| rng.random_range(16..=255));
    format!("#{r:02X}{g:02X}{b:02X}")
}

/// Whether `color` is a `#RRGGBB` hex string.
pub fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}
