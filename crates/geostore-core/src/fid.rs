//! Composite feature identifiers.
//!
//! A versioned FID carries its version as a `_version<N>` suffix, e.g.
//! `ROAD_7_version3`. Decoding never fails: a malformed suffix is logged and
//! the whole string is treated as an unversioned id.

const VERSION_SEPARATOR: &str = "_version";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionedFid {
    pub fid: String,
    pub version: Option<u32>,
}

pub fn encode(fid: &str, version: Option<u32>) -> String {
    match version {
        Some(version) => format!("{fid}{VERSION_SEPARATOR}{version}"),
        None => fid.to_string(),
    }
}

pub fn decode(s: &str) -> VersionedFid {
    if let Some(pos) = s.rfind(VERSION_SEPARATOR) {
        let suffix = &s[pos + VERSION_SEPARATOR.len()..];
        match suffix.parse() {
            Ok(version) if pos > 0 => {
                return VersionedFid {
                    fid: s[..pos].to_string(),
                    version: Some(version),
                }
            }
            _ => {
                tracing::warn!(fid = s, "malformed version suffix, treating id as unversioned");
            }
        }
    }

    VersionedFid {
        fid: s.to_string(),
        version: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versioned() {
        assert_eq!(encode("A1", Some(3)), "A1_version3");
        assert_eq!(
            decode("A1_version3"),
            VersionedFid {
                fid: "A1".into(),
                version: Some(3)
            }
        );
    }

    #[test]
    fn unversioned() {
        assert_eq!(encode("A1", None), "A1");
        assert_eq!(decode("A1").version, None);
    }

    #[test]
    fn malformed_suffix_falls_back() {
        assert_eq!(
            decode("A1_versionXYZ"),
            VersionedFid {
                fid: "A1_versionXYZ".into(),
                version: None
            }
        );
        assert_eq!(decode("_version2").fid, "_version2");
        assert_eq!(decode("A1_version").version, None);
    }
}
