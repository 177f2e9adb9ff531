//! Program images in Verilog `$readmemh` style: whitespace-separated
//! 32-bit hex words, with `//` comments and blank lines ignored.

use std::path::Path;

use crate::*;

pub fn parse_hex(src: &str) -> Result<Vec<u32>> {
    let mut words = Vec::new();
    for (lineno, line) in src.lines().enumerate() {
        let line = match line.find("//") {
            Some(at) => &line[..at],
            None => line,
        };
        for tok in line.split_whitespace() {
            let digits = tok.strip_prefix("0x").unwrap_or(tok);
            match u32::from_str_radix(digits, 16) {
                Ok(word) => words.push(word),
                Err(_) => {
                    warn!("bad hex word '{}' on line {}", tok, lineno + 1);
                    return Err(Error::BadHexWord(lineno + 1, tok.to_string()));
                }
            }
        }
    }
    Ok(words)
}

pub fn load_hex_file(path: &Path) -> Result<Vec<u32>> {
    let src = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(e, path.to_string_lossy().to_string()))?;
    parse_hex(&src)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        log::log_init(log::Level::Off);
        let src = "00100093\n00102023 00102223\n";
        let words = parse_hex(src).unwrap();
        assert_eq!(words, vec![0x00100093, 0x00102023, 0x00102223]);
    }

    #[test]
    fn test_comments_and_blanks() {
        log::log_init(log::Level::Off);
        let src = "// boot\n\n00100093 // addi x1, x0, 1\n\n// done\n";
        let words = parse_hex(src).unwrap();
        assert_eq!(words, vec![0x00100093]);
    }

    #[test]
    fn test_0x_prefix() {
        log::log_init(log::Level::Off);
        let words = parse_hex("0xdeadbeef beef").unwrap();
        assert_eq!(words, vec![0xdeadbeef, 0xbeef]);
    }

    #[test]
    fn test_bad_word_reports_line() {
        log::log_init(log::Level::Off);
        let err = parse_hex("00100093\nnotahexword\n").unwrap_err();
        assert!(matches!(err, Error::BadHexWord(2, ref tok) if tok == "notahexword"));
    }
}
