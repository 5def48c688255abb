//! Triangular summary table of intersection sizes.
//!
//! For each combination size `r` in `1..n` there is one block: a header naming
//! every dataset with its size, then one row per `r`-combination with a cell
//! for each dataset not already in it. A cell compares the `(r + 1)`-way merge
//! against the row's combination and against the added dataset:
//!
//! ```text
//!         A (10)                  B (8)                   C (6)
//! A (10)                          4/10 (40.0%) : 4/8 (50.0%)   3/10 (30.0%) : 3/6 (50.0%)
//! ```

use crate::combinations::{CombinationKey, Combinations};
use crate::compare::FusionComparator;
use crate::error::{FusionError, Result};
use crate::output::{OutputTarget, TsvWriter};
use crate::overlap::OverlapComplex;
use std::io::Write;

/// Separator between dataset names in a row label.
pub const DEFAULT_GLUE: &str = " & ";

/// Render `a/b (p%)`, or `0` when `b` is zero.
fn write_ratio<W: Write>(out: &mut TsvWriter<W>, a: usize, b: usize) -> Result<()> {
    if b == 0 {
        return out.write_str("0");
    }
    out.write_int(a)?;
    out.write_str("/")?;
    out.write_int(b)?;
    out.write_str(" (")?;
    out.write_float(percentage(a, b))?;
    out.write_str("%)")
}

/// `100 * a / b` rounded to two decimals, ties to even.
fn percentage(a: usize, b: usize) -> f64 {
    (10_000.0 * a as f64 / b as f64).round_ties_even() / 100.0
}

impl<C: FusionComparator> OverlapComplex<C> {
    /// Write the summary table to a file or, for `-`, standard output.
    pub fn export_summary(&self, target: &OutputTarget) -> Result<()> {
        let mut out = target.writer()?;
        self.write_summary(&mut out, DEFAULT_GLUE)?;
        out.flush()
    }

    /// Write the summary table; requires a completed overlay run.
    pub fn write_summary<W: Write>(&self, out: &mut TsvWriter<W>, glue: &str) -> Result<()> {
        let n = self.datasets.len();

        for r in 1..n {
            for (i, dataset) in self.datasets.iter().enumerate() {
                out.write_tab()?;
                out.write_str(&self.dataset_names[i])?;
                out.write_str(" (")?;
                out.write_int(dataset.len())?;
                out.write_str(")")?;
            }
            out.write_newline()?;

            for members in Combinations::new(n, r) {
                let vertical = CombinationKey::new(members.iter().map(|i| i + 1));
                let b = self.required_total(&vertical)?;

                out.write_str(&self.label(&vertical, glue))?;
                out.write_str(" (")?;
                out.write_int(b)?;
                out.write_str(")")?;

                for horizontal in 1..=n {
                    out.write_tab()?;
                    if vertical.indices().contains(&horizontal) {
                        continue;
                    }

                    let a = self.required_total(&vertical.with(horizontal))?;
                    let c = self.datasets[horizontal - 1].len();

                    write_ratio(out, a, b)?;
                    out.write_str(" : ")?;
                    write_ratio(out, a, c)?;
                }
                out.write_newline()?;
            }

            out.write_newline()?;
            out.write_newline()?;
        }

        Ok(())
    }

    fn required_total(&self, key: &CombinationKey) -> Result<usize> {
        self.total(key)
            .ok_or_else(|| FusionError::MissingCombination(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverlapConfig;
    use crate::reader::parse_fusions;

    fn render(complex: &OverlapComplex) -> String {
        let mut output = Vec::new();
        {
            let mut writer = TsvWriter::new(&mut output);
            complex.write_summary(&mut writer, DEFAULT_GLUE).unwrap();
            writer.flush().unwrap();
        }
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(4, 10), 40.0);
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(5, 5), 100.0);
        // Exact ties go to the even digit
        assert_eq!(percentage(1, 32), 3.12);
        assert_eq!(percentage(5, 32), 15.62);
        assert_eq!(percentage(3, 8), 37.5);
    }

    #[test]
    fn test_ratio_tie_rendering() {
        let mut output = Vec::new();
        {
            let mut writer = TsvWriter::new(&mut output);
            write_ratio(&mut writer, 1, 32).unwrap();
            writer.write_str(" : ").unwrap();
            write_ratio(&mut writer, 5, 32).unwrap();
            writer.flush().unwrap();
        }
        assert_eq!(output, b"1/32 (3.12%) : 5/32 (15.62%)");
    }

    #[test]
    fn test_ratio_zero_denominator() {
        let mut output = Vec::new();
        {
            let mut writer = TsvWriter::new(&mut output);
            write_ratio(&mut writer, 0, 0).unwrap();
            writer.write_str(" : ").unwrap();
            write_ratio(&mut writer, 1, 3).unwrap();
            writer.flush().unwrap();
        }
        assert_eq!(output, b"0 : 1/3 (33.33%)");
    }

    #[test]
    fn test_two_dataset_table() {
        let t = "chr21\t100\tchr21\t900\t-\t-\tTMPRSS2\tERG\n";
        let e = "chr2\t100\tchr2\t900\t+\t-\tEML4\tALK\n";
        let mut complex = OverlapComplex::new();
        complex.add(parse_fusions(&format!("{}{}", t, e), "A", 1, None).unwrap());
        complex.add(parse_fusions(t, "B", 2, None).unwrap());
        complex.overlay(&OverlapConfig::default()).unwrap();

        let text = render(&complex);
        assert_eq!(
            text,
            "\tA (2)\tB (1)\n\
             A (2)\t\t1/2 (50.0%) : 1/1 (100.0%)\n\
             B (1)\t1/1 (100.0%) : 1/2 (50.0%)\t\n\
             \n\n"
        );
    }

    #[test]
    fn test_summary_before_overlay_is_an_error() {
        let t = "chr21\t100\tchr21\t900\t-\t-\tTMPRSS2\tERG\n";
        let mut complex = OverlapComplex::new();
        complex.add(parse_fusions(t, "A", 1, None).unwrap());
        complex.add(parse_fusions(t, "B", 2, None).unwrap());

        let mut output = Vec::new();
        let mut writer = TsvWriter::new(&mut output);
        let result = complex.write_summary(&mut writer, DEFAULT_GLUE);
        assert!(matches!(result, Err(FusionError::MissingCombination(_))));
    }

    #[test]
    fn test_single_dataset_writes_nothing() {
        let mut complex = OverlapComplex::new();
        complex.add(parse_fusions("chr1\t1\tchr2\t2\n", "A", 1, None).unwrap());
        complex.overlay(&OverlapConfig::default()).unwrap();

        assert!(render(&complex).is_empty());
    }
}
