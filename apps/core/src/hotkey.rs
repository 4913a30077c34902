use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    pub modifiers: Vec<String>,
    pub key: String,
}

/// Splits a textual chord such as `"ctrl+alt+c"` into modifiers and key.
/// Whitespace around parts is ignored.
pub fn parse_chord(input: &str) -> Result<Chord, String> {
    let parts: Vec<&str> = input
        .split('+')
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect();

    if parts.len() < 2 {
        return Err(format!(
            "chord '{input}' must include at least one modifier and one key"
        ));
    }

    Ok(Chord {
        modifiers: parts[..parts.len() - 1]
            .iter()
            .map(|part| part.to_lowercase())
            .collect(),
        key: parts[parts.len() - 1].to_lowercase(),
    })
}

/// Validates a chord and returns its canonical lowercase form with modifiers
/// ordered `ctrl`, `alt`, `shift`, `win`. Two descriptors that differ only in
/// spelling or modifier order canonicalize to the same string, which is what
/// the registry compares for collisions.
pub fn canonical_chord(input: &str) -> Result<String, String> {
    let chord = parse_chord(input)?;

    let mut modifiers: BTreeSet<&'static str> = BTreeSet::new();
    for modifier in &chord.modifiers {
        modifiers.insert(normalize_modifier(modifier)?);
    }
    let key = normalize_key(&chord.key)?;

    let mut ordered = Vec::new();
    for candidate in ["ctrl", "alt", "shift", "win"] {
        if modifiers.contains(candidate) {
            ordered.push(candidate.to_string());
        }
    }
    ordered.push(key);
    Ok(ordered.join("+"))
}

fn normalize_modifier(input: &str) -> Result<&'static str, String> {
    match input {
        "ctrl" | "control" => Ok("ctrl"),
        "alt" => Ok("alt"),
        "shift" => Ok("shift"),
        "win" | "windows" | "meta" | "super" => Ok("win"),
        other => Err(format!(
            "unsupported modifier '{other}'; use ctrl, alt, shift, or win"
        )),
    }
}

fn normalize_key(input: &str) -> Result<String, String> {
    if input.is_empty() {
        return Err("chord key is required".to_string());
    }

    if input == "space" {
        return Ok("space".to_string());
    }

    if let Some(number) = input.strip_prefix('f') {
        if let Ok(parsed) = number.parse::<u8>() {
            if (1..=12).contains(&parsed) {
                return Ok(format!("f{parsed}"));
            }
            return Err("function key must be between f1 and f12".to_string());
        }
    }

    if input.len() == 1 {
        let c = input.chars().next().unwrap_or_default();
        if c.is_ascii_alphanumeric() {
            return Ok(input.to_string());
        }
    }

    Err(format!(
        "unsupported key '{input}'; use a-z, 0-9, space, or f1-f12"
    ))
}
