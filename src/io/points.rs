//! Plain-text point list export

use super::IoError;
use crate::float_types::Real;
use nalgebra::Point3;
use std::io::Write;
use std::path::Path;

/// Write one `x y z` line per point.
pub fn write_points<'a, W, I>(points: I, out: &mut W) -> Result<(), IoError>
where
    W: Write,
    I: IntoIterator<Item = &'a Point3<Real>>,
{
    for p in points {
        writeln!(out, "{} {} {}", p.x, p.y, p.z)?;
    }
    Ok(())
}

/// Write a point list file at `path`.
pub fn save_points<'a, I>(points: I, path: impl AsRef<Path>) -> Result<(), IoError>
where
    I: IntoIterator<Item = &'a Point3<Real>>,
{
    super::write_file(path.as_ref(), |out| write_points(points, out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_per_point() {
        let points = [Point3::new(1.0, 2.0, 3.0), Point3::new(-0.5, 0.25, 0.0)];
        let mut out = Vec::new();
        write_points(&points, &mut out).expect("in-memory write");
        assert_eq!(String::from_utf8(out).expect("utf8"), "1 2 3\n-0.5 0.25 0\n");
    }
}
