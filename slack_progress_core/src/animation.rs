use std::ops::Deref;
use std::sync::Arc;

/// Immutable, cheaply cloneable animation sequence shared by a session and
/// the renderer. May be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frames(Arc<[String]>);

impl Frames {
    pub fn new(frames: Vec<String>) -> Self {
        Self(frames.into())
    }
}

impl Deref for Frames {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for Frames {
    fn from(frames: Vec<String>) -> Self {
        Self::new(frames)
    }
}

/// Advance the animation by one step.
///
/// Returns the frame to show and the index to pass in next time. The index
/// moves *before* the frame is picked, so starting from 0 the first call
/// yields the second element: frame 0 was already shown at creation.
/// An empty sequence is a no-op: `("", index)`. Out-of-range indices are
/// reduced modulo the sequence length first.
pub fn next_frame(frames: &[String], index: usize) -> (&str, usize) {
    if frames.is_empty() {
        return ("", index);
    }
    let next = (index % frames.len() + 1) % frames.len();
    (frames[next].as_str(), next)
}

/// Text of a freshly created status message: prefix immediately followed by
/// the first frame, e.g. `Building|`.
pub fn render_initial(prefix: &str, frames: &[String]) -> String {
    match frames.first() {
        Some(frame) => format!("{prefix}{frame}"),
        None => prefix.to_string(),
    }
}

/// Text of a status update: `*prefix* *frame* ```status````.
///
/// With no frame (empty sequence) the frame segment is left out entirely
/// rather than rendering empty emphasis markers.
pub fn render_update(prefix: &str, frame: &str, status: &str) -> String {
    if frame.is_empty() {
        format!("*{prefix}* ```{status}```")
    } else {
        format!("*{prefix}* *{frame}* ```{status}```")
    }
}
