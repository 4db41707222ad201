//! Uniform handling of angles.
//!
//! An [`Angle`] is always stored in radians. It can be built from, and
//! converted to, signed hours-minutes-seconds ("shms"), signed
//! degrees-minutes-seconds ("sdms"), radians and degrees.

mod error;
#[cfg(test)]
mod tests;

pub use error::AngleError;

use std::{
    f64::consts::PI,
    fmt,
    ops::{Add, Div, Mul, Neg, Sub},
};

/// A sexagesimal triplet with its sign: (sign, hours or degrees, minutes,
/// seconds).
pub type Sexagesimal = (char, u32, u32, f64);

/// +1 if `number` >= 0.0 (this includes -0.0), -1 otherwise.
pub fn signum(number: f64) -> i32 {
    if number < 0.0 {
        -1
    } else {
        1
    }
}

/// '+' if `number` >= 0.0 (this includes -0.0), '-' otherwise.
pub fn sign_char(number: f64) -> char {
    if signum(number) < 0 {
        '-'
    } else {
        '+'
    }
}

/// -1 for '-', +1 for '+'. Anything else is an error.
pub fn int_from_sign_char(c: char) -> Result<i32, AngleError> {
    match c {
        '+' => Ok(1),
        '-' => Ok(-1),
        _ => Err(AngleError::InvalidSignChar(c)),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Angle {
    rad: f64,
}

impl Angle {
    pub fn from_rad(rad: f64) -> Angle {
        Angle { rad }
    }

    pub fn from_deg(deg: f64) -> Angle {
        Angle {
            rad: deg * PI / 180.0,
        }
    }

    /// e.g. `Angle::from_shms('+', 13, 59, 12.4)`. The sign is required.
    pub fn from_shms(
        sign: char,
        hours: u32,
        minutes: u32,
        seconds: f64,
    ) -> Result<Angle, AngleError> {
        let mut angle = Angle::default();
        angle.set_shms(sign, hours, minutes, seconds)?;
        Ok(angle)
    }

    /// e.g. `Angle::from_sdms('-', 359, 59, 12.4)`. The sign is required.
    pub fn from_sdms(
        sign: char,
        degrees: u32,
        minutes: u32,
        seconds: f64,
    ) -> Result<Angle, AngleError> {
        let mut angle = Angle::default();
        angle.set_sdms(sign, degrees, minutes, seconds)?;
        Ok(angle)
    }

    /// Build an angle from exactly one of the four representations. This is
    /// the entry point for loosely-typed input (e.g. plan files), where any
    /// combination of the fields may have been supplied.
    pub fn try_new(
        shms: Option<Sexagesimal>,
        sdms: Option<Sexagesimal>,
        rad: Option<f64>,
        deg: Option<f64>,
    ) -> Result<Angle, AngleError> {
        let num_given = [shms.is_some(), sdms.is_some(), rad.is_some(), deg.is_some()]
            .into_iter()
            .filter(|&given| given)
            .count();
        match (shms, sdms, rad, deg) {
            (Some((s, h, m, sec)), None, None, None) => Angle::from_shms(s, h, m, sec),
            (None, Some((s, d, m, sec)), None, None) => Angle::from_sdms(s, d, m, sec),
            (None, None, Some(rad), None) => Ok(Angle::from_rad(rad)),
            (None, None, None, Some(deg)) => Ok(Angle::from_deg(deg)),
            _ => Err(AngleError::NotExactlyOne(num_given)),
        }
    }

    /// Parse e.g. "+08:13:36.0678" or "8 13 36.0678" as hours. A missing sign
    /// means '+'.
    pub fn parse_shms(s: &str) -> Result<Angle, AngleError> {
        let (sign, hours, minutes, seconds) = parse_sexagesimal(s)?;
        Angle::from_shms(sign, hours, minutes, seconds)
    }

    /// Parse e.g. "+48:13:02.581" or "-5 23 28" as degrees. A missing sign
    /// means '+'.
    pub fn parse_sdms(s: &str) -> Result<Angle, AngleError> {
        let (sign, degrees, minutes, seconds) = parse_sexagesimal(s)?;
        Angle::from_sdms(sign, degrees, minutes, seconds)
    }

    pub fn set_shms(
        &mut self,
        sign: char,
        hours: u32,
        minutes: u32,
        seconds: f64,
    ) -> Result<f64, AngleError> {
        let sgn = f64::from(int_from_sign_char(sign)?);
        self.rad =
            sgn * PI * (f64::from(hours) + f64::from(minutes) / 60.0 + seconds / 3600.0) / 12.0;
        Ok(self.rad)
    }

    pub fn set_sdms(
        &mut self,
        sign: char,
        degrees: u32,
        minutes: u32,
        seconds: f64,
    ) -> Result<f64, AngleError> {
        let sgn = f64::from(int_from_sign_char(sign)?);
        self.rad =
            sgn * PI * (f64::from(degrees) + f64::from(minutes) / 60.0 + seconds / 3600.0) / 180.0;
        Ok(self.rad)
    }

    pub fn set_rad(&mut self, rad: f64) -> f64 {
        self.rad = rad;
        self.rad
    }

    pub fn set_deg(&mut self, deg: f64) -> f64 {
        self.rad = deg * PI / 180.0;
        self.rad
    }

    pub fn as_rad(&self) -> f64 {
        self.rad
    }

    pub fn as_deg(&self) -> f64 {
        self.rad * 180.0 / PI
    }

    pub fn as_shms(&self) -> Sexagesimal {
        decompose(sign_char(self.rad), self.rad.abs() * 12.0 / PI)
    }

    pub fn as_sdms(&self) -> Sexagesimal {
        decompose(sign_char(self.rad), self.rad.abs() * 180.0 / PI)
    }

    /// e.g. "+08:13:36.0678" for `decimals` = 4. Rounding carries into the
    /// minutes and hours, so 59.99999 seconds never prints as "60.0000".
    pub fn format_shms(&self, decimals: usize) -> String {
        format_sexagesimal(sign_char(self.rad), self.rad.abs() * 12.0 / PI, decimals)
    }

    /// e.g. "+48:13:02.5810" for `decimals` = 4.
    pub fn format_sdms(&self, decimals: usize) -> String {
        format_sexagesimal(sign_char(self.rad), self.rad.abs() * 180.0 / PI, decimals)
    }
}

fn decompose(sign: char, in_units: f64) -> Sexagesimal {
    let whole = in_units.floor();
    let in_minutes = (in_units - whole) * 60.0;
    let minutes = in_minutes.floor();
    let seconds = (in_minutes - minutes) * 60.0;
    (sign, whole as u32, minutes as u32, seconds)
}

/// Beyond this, f64 seconds carry no more information.
const MAX_DECIMALS: usize = 9;

fn format_sexagesimal(sign: char, in_units: f64, decimals: usize) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    // Count in integer steps of the last printed decimal so that the rounding
    // carries.
    let steps_per_second = 10_u64.pow(decimals as u32);
    let total = (in_units * 3600.0 * steps_per_second as f64).round() as u64;
    let whole = total / (3600 * steps_per_second);
    let minutes = (total / (60 * steps_per_second)) % 60;
    let seconds = (total % (60 * steps_per_second)) as f64 / steps_per_second as f64;
    let width = if decimals == 0 { 2 } else { decimals + 3 };
    format!("{sign}{whole:02}:{minutes:02}:{seconds:0width$.decimals$}")
}

/// Split e.g. "-05:23:28.1" into its sign and fields, without interpreting
/// the leading field as hours or degrees.
pub fn parse_sexagesimal(s: &str) -> Result<Sexagesimal, AngleError> {
    let err = |reason| AngleError::Parse {
        input: s.to_string(),
        reason,
    };

    let trimmed = s.trim();
    let (sign, rest) = match trimmed.chars().next() {
        Some(c @ ('+' | '-')) => (c, &trimmed[1..]),
        Some(_) => ('+', trimmed),
        None => return Err(err("empty string")),
    };
    let fields: Vec<&str> = rest
        .split(|c: char| c == ':' || c.is_whitespace())
        .filter(|f| !f.is_empty())
        .collect();
    if fields.is_empty() || fields.len() > 3 {
        return Err(err("expected between one and three fields"));
    }

    let whole: u32 = fields[0]
        .parse()
        .map_err(|_| err("leading field is not a whole number"))?;
    let minutes: u32 = match fields.get(1) {
        Some(f) => f.parse().map_err(|_| err("minutes are not a whole number"))?,
        None => 0,
    };
    let seconds: f64 = match fields.get(2) {
        Some(f) => f.parse().map_err(|_| err("seconds are not a number"))?,
        None => 0.0,
    };
    if minutes >= 60 || !(0.0..60.0).contains(&seconds) {
        return Err(err("minutes and seconds must be in [0, 60)"));
    }

    Ok((sign, whole, minutes, seconds))
}

impl From<Angle> for f64 {
    fn from(angle: Angle) -> f64 {
        angle.rad
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Angle(rad = {})", self.rad)
    }
}

// Arithmetic with either plain numbers or other angles; the right-hand side is
// taken in radians.
impl<T: Into<f64>> Add<T> for Angle {
    type Output = Angle;

    fn add(self, rhs: T) -> Angle {
        Angle::from_rad(self.rad + rhs.into())
    }
}

impl<T: Into<f64>> Sub<T> for Angle {
    type Output = Angle;

    fn sub(self, rhs: T) -> Angle {
        Angle::from_rad(self.rad - rhs.into())
    }
}

impl<T: Into<f64>> Mul<T> for Angle {
    type Output = Angle;

    fn mul(self, rhs: T) -> Angle {
        Angle::from_rad(self.rad * rhs.into())
    }
}

impl<T: Into<f64>> Div<T> for Angle {
    type Output = Angle;

    fn div(self, rhs: T) -> Angle {
        Angle::from_rad(self.rad / rhs.into())
    }
}

impl Neg for Angle {
    type Output = Angle;

    fn neg(self) -> Angle {
        Angle::from_rad(-self.rad)
    }
}
