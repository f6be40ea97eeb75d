//! Parser for sysfs-style properties files (`key=value`, one per line).

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

/// Read a properties file into a map. Lines without a `=` past the first
/// column are skipped; later keys overwrite earlier ones.
pub fn read_properties(path: &Path) -> io::Result<HashMap<String, String>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_properties(&content))
}

pub fn parse_properties(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        let Some(eq) = line.find('=') else { continue };
        if eq == 0 {
            continue;
        }
        let key = &line[..eq];
        let value = &line[eq + 1..];
        map.insert(key.to_string(), value.to_string());
    }
    map
}
