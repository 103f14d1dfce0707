/// Token that turns a line into a kata-marker line once any leading
/// whitespace is skipped.
pub const KATA_MARKER: &str = "////";

/// A parsed kata-marker line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KataLine<'a> {
	/// Whitespace run before the marker, kept verbatim in the output.
	pub indent: &'a str,
	/// Text after the marker with the whitespace directly after it removed.
	pub payload: &'a str,
}

impl KataLine<'_> {
	/// The line that replaces the suppressed block.
	pub fn render(&self) -> String {
		format!("{}{}", self.indent, self.payload)
	}
}

/// Result of kataifying a blob of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Kataified {
	pub content: String,
	/// Number of kata-marker lines found.
	pub markers: usize,
	/// Number of lines dropped because they followed a marker.
	pub removed_lines: usize,
}

impl Kataified {
	/// True when the transform changed nothing.
	pub fn is_unchanged(&self) -> bool {
		self.markers == 0
	}
}

/// Parse a single line (without its `\n`) as a kata-marker line.
pub fn parse_kata_line(line: &str) -> Option<KataLine<'_>> {
	let rest = line.trim_start();
	let indent = &line[..line.len() - rest.len()];
	let after_marker = rest.strip_prefix(KATA_MARKER)?;

	Some(KataLine {
		indent,
		payload: after_marker.trim_start(),
	})
}

/// Returns true if any line of `content` is a kata-marker line.
pub fn has_kata_markers(content: &str) -> bool {
	content.split('\n').any(|line| parse_kata_line(line).is_some())
}

/// Replace every block that follows a kata-marker line with the marker's
/// payload.
///
/// ```
/// use kataify_core::kataify_file;
///
/// let source = "  ////let answer = todo!();\n  let answer = 42;";
/// assert_eq!(kataify_file(source), "  let answer = todo!();");
/// ```
pub fn kataify_file(content: &str) -> String {
	kataify_content(content).content
}

/// Same as [`kataify_file`] but also reports what was replaced.
pub fn kataify_content(content: &str) -> Kataified {
	let mut lines = Vec::new();
	let mut markers = 0;
	let mut removed_lines = 0;
	let mut suppressing = false;

	for line in content.split('\n') {
		if let Some(kata_line) = parse_kata_line(line) {
			lines.push(kata_line.render());
			markers += 1;
			suppressing = true;
		} else if suppressing {
			removed_lines += 1;
		} else {
			lines.push(line.to_string());
		}
	}

	Kataified {
		content: lines.join("\n"),
		markers,
		removed_lines,
	}
}
