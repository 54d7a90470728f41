// Author: Dustin Pilgrim
// License: MIT

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::config::{Config, Member};

/// Serializes as the flattened view of the scope: own members first, then
/// inherited members not shadowed locally, matching [`Config::keys`].
impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let keys = self.keys();
        let mut map = serializer.serialize_map(Some(keys.len()))?;
        for key in keys {
            match self.get(&key) {
                Some(Member::Property(node)) => map.serialize_entry(&key, &node.value)?,
                Some(Member::Class(class)) => map.serialize_entry(&key, &class)?,
                None => {}
            }
        }
        map.end()
    }
}

/// Pretty-printed JSON for a whole tree.
pub fn to_json(config: &Config) -> String {
    serde_json::to_string_pretty(config).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::decode_str;

    #[test]
    fn test_json_export() {
        let config = decode_str("test.cpp", "x = 1; class A { s = \"hi\"; };").unwrap();
        let json: serde_json::Value = serde_json::from_str(&to_json(&config)).unwrap();
        assert_eq!(json["x"], 1);
        assert_eq!(json["A"]["s"], "hi");
    }

    #[test]
    fn test_json_export_includes_inherited() {
        let config =
            decode_str("test.cpp", "class A { x = 1; }; class B : A { y = 2; };").unwrap();
        let json: serde_json::Value = serde_json::from_str(&to_json(&config)).unwrap();
        assert_eq!(json["B"]["x"], 1);
        assert_eq!(json["B"]["y"], 2);
    }

    #[test]
    fn test_json_export_array() {
        let config = decode_str("test.cpp", "arr[] = {1, 2, {3, 4}};").unwrap();
        let json: serde_json::Value = serde_json::from_str(&to_json(&config)).unwrap();
        assert_eq!(json["arr"][2][1], 4);
    }
}
