//! Acknowledgment key derivation.
//!
//! Ack keys are hierarchical, `/`-separated paths. A record's key prefix
//! namespaces every key derived from it, so an acknowledgment-tracking store
//! can count the distinct keys under a prefix to decide whether every
//! addressed node has answered.

/// Separator between ack key segments.
pub const SEPARATOR: char = '/';

/// Joins `segments` into a single cleaned ack key path.
///
/// Empty segments are skipped, so joining with an empty prefix yields the
/// remaining segments unchanged. Joining nothing but empty segments yields an
/// empty string.
///
/// ```
/// use ingest_cluster::ack_key::join;
///
/// assert_eq!(join(["ack", "node-0"]), "ack/node-0");
/// assert_eq!(join(["ack//", "node-0"]), "ack/node-0");
/// assert_eq!(join(["", "node-0"]), "node-0");
/// ```
#[must_use]
pub fn join<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for segment in segments {
        let segment = segment.as_ref();
        if segment.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push(SEPARATOR);
        }
        joined.push_str(segment);
    }

    if joined.is_empty() {
        return joined;
    }

    clean(&joined)
}

/// Lexically normalizes a path: collapses repeated separators, drops `.`
/// segments and trailing separators, and lets `..` consume the segment
/// before it. A leading separator is kept.
fn clean(path: &str) -> String {
    let rooted = path.starts_with(SEPARATOR);
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    if rooted {
        format!("{SEPARATOR}{body}")
    } else if body.is_empty() {
        ".".to_string()
    } else {
        body
    }
}

/// A record that namespaces node acknowledgments under a key prefix.
pub trait AckKeyed {
    /// The prefix every ack key of this record starts with.
    fn ack_key_prefix(&self) -> &str;

    /// The key under which `node_name`'s acknowledgment is tracked.
    ///
    /// Pure function of the prefix and the node name: repeated calls return
    /// the same key, and distinct plain node names yield distinct keys.
    #[must_use]
    fn ack_key(&self, node_name: &str) -> String {
        join([self.ack_key_prefix(), node_name])
    }
}
