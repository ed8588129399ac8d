use std::io::{self, BufRead, Write};

use chrono::NaiveDate;

use crate::dates;

/// Ask the operator to pick `newer` (0) or `older` (1); repeats until one is chosen.
pub fn choose_date<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    newer: NaiveDate,
    older: NaiveDate,
) -> io::Result<NaiveDate> {
    writeln!(output, "There are no images on that date.")?;
    writeln!(
        output,
        "Choose between these 2 options: (0) {}, (1) {}",
        dates::format(newer),
        dates::format(older)
    )?;

    let mut line = String::new();
    loop {
        writeln!(output, "Type 0 or 1:")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before a date was chosen",
            ));
        }
        match line.trim() {
            "0" => return Ok(newer),
            "1" => return Ok(older),
            _ => continue,
        }
    }
}
