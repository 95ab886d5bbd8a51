//! Built-in calibration points
//!
//! Seeded into a fresh calibration file. Pairs span Yekaterinburg, Saint
//! Petersburg, Chelyabinsk, Nizhny Novgorod, Tyumen, Yakutsk, Cheboksary and
//! Ulan-Ude.

use super::CalibrationPoint;
use crate::geo::CoordinatePoint;

/// (source, target) pairs as (lat, lon) tuples
#[rustfmt::skip]
pub const BUILTIN_CALIBRATION: [((f64, f64), (f64, f64)); 31] = [
    ((56.82811805737119, 60.61426164412377), (56.828106, 60.614287)),
    ((56.86259891560065, 60.6572500903253), (56.862586, 60.657278)),
    ((56.906666700192716, 60.63861543087929), (56.906652, 60.638628)),
    ((56.909591402519915, 60.5950190263033), (56.909575, 60.595034)),
    ((56.87863660391573, 60.51722444081701), (56.87863, 60.517245)),
    ((56.781989564663476, 60.53752005594862), (56.781985, 60.537538)),
    ((56.78862468710676, 60.651199174559736), (56.78862, 60.651223)),
    ((56.80968834490725, 60.56463415653675), (56.809684, 60.564653)),
    ((56.79674324537193, 60.620513467301855), (56.796731, 60.620529)),
    ((56.826145898242764, 60.60015154151012), (56.826133, 60.600177)),
    ((56.89324984612583, 60.57766089933516), (56.893228, 60.577675)),
    ((56.885031152408864, 60.50838738450612), (56.885019, 60.508406)),
    ((56.88387294721526, 60.5001406084767), (56.883864, 60.500160)),
    ((59.938910517751964, 30.3142877746221), (59.938946, 30.314283)),
    ((59.87644544335019, 30.374270379623916), (59.876472, 30.374265)),
    ((59.962981728189405, 30.494793702118574), (59.962993, 30.494808)),
    ((60.06028554274266, 30.41687044365594), (60.060287, 30.416894)),
    ((55.178505866136376, 61.458797115710254), (55.178509, 61.458815)),
    ((56.31857864399124, 44.00491972362694), (56.318603, 44.004937)),
    ((56.33901617217321, 43.95225351295961), (56.339029, 43.952260)),
    ((56.398701063262536, 43.985588829111364), (56.398709, 43.985600)),
    ((57.1508971355925, 65.55846964059829), (57.150906, 65.558491)),
    ((57.17835206448346, 65.56925933783715), (57.178346, 65.569273)),
    ((57.11876675058166, 65.48813022260148), (57.118771, 65.488159)),
    ((62.02797499644836, 129.76162940491085), (62.027965, 129.761650)),
    ((62.05203840919141, 129.71767049344646), (62.052036, 129.717689)),
    ((56.140030547089054, 47.24760888056219), (56.140049, 47.247614)),
    ((56.12298277856921, 47.26660062665822), (56.123003, 47.266606)),
    ((56.149800604524664, 47.17474603595798), (56.149809, 47.174721)),
    ((56.13225084586679, 47.15316591517464), (56.132254, 47.153140)),
    ((51.8242809475715, 107.57781015145557), (51.824287, 107.577818)),
];

/// Built-in points with empty places, source/target in round-trip notation.
pub(crate) fn builtin_points() -> Vec<CalibrationPoint> {
    BUILTIN_CALIBRATION
        .iter()
        .map(|&((slat, slon), (tlat, tlon))| {
            CalibrationPoint::new(
                CoordinatePoint::new(slat, slon).to_string(),
                CoordinatePoint::new(tlat, tlon).to_string(),
                "",
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{classify, SourceKind};

    #[test]
    fn test_builtin_count() {
        assert_eq!(builtin_points().len(), 31);
    }

    #[test]
    fn test_builtin_points_classify_as_pairs() {
        for point in builtin_points() {
            assert_eq!(classify(&point.source), SourceKind::HighPrecision, "{}", point.source);
            assert_eq!(classify(&point.target), SourceKind::LowPrecision, "{}", point.target);
        }
    }

    #[test]
    fn test_builtin_text_matches_round_trip_notation() {
        let first = &builtin_points()[0];
        assert_eq!(first.source, "56.82811805737119, 60.61426164412377");
        assert_eq!(first.target, "56.828106, 60.614287");
        // Trailing zero dropped, as in files written by earlier releases.
        assert_eq!(builtin_points()[12].target, "56.883864, 60.50016");
    }
}
