use similar::{Algorithm, ChangeTag, TextDiff};

const COLOR_OPEN: &str = "\x1b[92m";
const COLOR_CLOSE: &str = "\x1b[0m";
const PLAIN_OPEN: &str = "<<";
const PLAIN_CLOSE: &str = ">>";

/// How inserted words are marked in the rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
	/// Bright green ANSI escape, for terminals.
	Color,
	/// `<<` and `>>`, for logs and anything that is not a terminal.
	Plain,
}

impl Marker {
	fn open(self) -> &'static str {
		match self {
			Marker::Color => COLOR_OPEN,
			Marker::Plain => PLAIN_OPEN,
		}
	}

	fn close(self) -> &'static str {
		match self {
			Marker::Color => COLOR_CLOSE,
			Marker::Plain => PLAIN_CLOSE,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
	Idle,
	InSpan,
}

struct Renderer {
	marker: Marker,
	state: State,
	output: String,
}

impl Renderer {
	fn new(marker: Marker) -> Self {
		Renderer { marker, state: State::Idle, output: String::new() }
	}

	fn unchanged(&mut self, word: &str) {
		self.close_span();
		self.output.push_str(word);
		self.output.push(' ');
	}

	fn inserted(&mut self, word: &str) {
		match self.state {
			State::Idle => {
				self.output.push_str(self.marker.open());
				self.state = State::InSpan;
			}
			State::InSpan => self.output.push(' '),
		}
		self.output.push_str(word);
	}

	fn close_span(&mut self) {
		if self.state == State::InSpan {
			self.output.push_str(self.marker.close());
			self.output.push(' ');
			self.state = State::Idle;
		}
	}

	fn finish(mut self) -> String {
		self.close_span();
		self.output
	}
}

/// Render `edited` word by word, marking the words that a minimal edit script
/// from `original` inserts.
///
/// Every rendered word is followed by a single space. Consecutive inserted
/// words share one highlight span, and words deleted from `original` are
/// dropped from the output without closing an open span.
pub fn highlight(original: &str, edited: &str, marker: Marker) -> String {
	let original_words: Vec<&str> = original.split_whitespace().collect();
	let edited_words: Vec<&str> = edited.split_whitespace().collect();

	let diff = TextDiff::configure()
		.algorithm(Algorithm::Myers)
		.diff_slices(original_words.as_slice(), edited_words.as_slice());

	let mut renderer = Renderer::new(marker);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Equal => renderer.unchanged(change.value()),
			ChangeTag::Insert => renderer.inserted(change.value()),
			ChangeTag::Delete => {}
		}
	}
	renderer.finish()
}
