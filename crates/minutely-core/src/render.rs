//! View models handed from the scheduler to the board renderer.

/// One frame's worth of content.
///
/// `Face` is the full-color redraw, `Seconds` the fast partial one;
/// `Notice` is the bordered message box used during bootstrap and for
/// fatal faults.
#[derive(Clone, Copy, Debug)]
pub enum Screen<'a> {
    Face {
        date: &'a str,
        hour: &'a str,
        minute: &'a str,
    },
    Seconds {
        second: &'a str,
    },
    Notice {
        title: &'a str,
        lines: &'a [&'a str],
    },
}
