use std::path::PathBuf;

/// Absolute path of a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// A testcase file whose first tree is `depth` nested `Negate` nodes over 7,
/// followed by a one-node testcase.
pub fn deep_negation(depth: usize) -> String {
    let mut text = String::from("<Test>\n");
    let expected = if depth % 2 == 0 { 7 } else { -7 };
    text.push_str(&format!("<Testcase name=\"deep\" type=\"Int\" expected=\"{}\">\n", expected));
    text.push_str(&"<Node op=\"Negate\">\n".repeat(depth));
    text.push_str("<Node op=\"IntLiteral\" content=\"7\"/>\n");
    text.push_str(&"</Node>\n".repeat(depth));
    text.push_str("</Testcase>\n");
    text.push_str("<Testcase name=\"after\" type=\"Int\" expected=\"1\">\n");
    text.push_str("<Node op=\"IntLiteral\" content=\"1\"/>\n");
    text.push_str("</Testcase>\n</Test>\n");
    text
}
