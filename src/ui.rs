// Output layer: renders results for the terminal. Titles go to the given
// writer (stdout in the binary) one per line so the output can be piped.

use std::io::{self, Write};

use crate::api::{Page, PagesResponse};

/// Write each title on its own line, in the order given.
pub fn print_titles<W: Write>(out: &mut W, pages: &[Page]) -> io::Result<()> {
    for page in pages {
        writeln!(out, "{}", page.title)?;
    }
    out.flush()
}

/// One-line summary such as `3 of 120 pages`.
pub fn count_summary(response: &PagesResponse) -> String {
    let noun = if response.count == 1 { "page" } else { "pages" };
    format!("{} of {} {}", response.pages.len(), response.count, noun)
}
