//! Maps command implementation.

use std::io;

use herakles_memlab::{MapsSummarizer, Recorder};

use crate::config::Config;

/// Prints the coalesced address-space layout.
pub fn command_maps(config: &Config, recorder: &mut Recorder) -> Result<(), Box<dyn std::error::Error>> {
    let maps = MapsSummarizer::new(&config.proc_dir()).with_anonymous_label(config.anonymous_label());
    maps.print(&mut io::stdout().lock(), recorder.buffer_mut())?;
    Ok(())
}
