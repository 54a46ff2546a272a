// The browser entry point is `qams_frontend::start`; trunk builds this bin
// for the HTML shell.
use qams_frontend as _;

fn main() {}
