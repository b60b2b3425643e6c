/// Population comparison between two countries
use crate::countries::CountryRecord;
use serde::{Deserialize, Serialize};

/// Response of `GET /countries/compare`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub country1: CountryRecord,
    pub country2: CountryRecord,
    pub population_difference: u64,
    pub message: String,
}

/// Compare two countries by population
///
/// The message names whichever country is strictly larger; equal populations
/// get their own message.
pub fn compare_populations(country1: CountryRecord, country2: CountryRecord) -> Comparison {
    let difference = country1.population.abs_diff(country2.population);

    let message = if country1.population > country2.population {
        larger_message(&country1.name, difference)
    } else if country2.population > country1.population {
        larger_message(&country2.name, difference)
    } else {
        format!(
            "{} and {} have the same population.",
            country1.name, country2.name
        )
    };

    Comparison {
        country1,
        country2,
        population_difference: difference,
        message,
    }
}

fn larger_message(name: &str, difference: u64) -> String {
    format!(
        "{} has a larger population by {} people.",
        name,
        group_thousands(difference)
    )
}

/// Format with comma thousands separators: 1234567 -> "1,234,567"
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn country(name: &str, population: u64) -> CountryRecord {
        CountryRecord {
            name: name.to_string(),
            capital: None,
            population,
            region: "Asia".to_string(),
        }
    }

    #[test]
    fn test_first_larger() {
        let result = compare_populations(country("China", 1_402_112_000), country("India", 1_380_004_385));
        assert_eq!(result.population_difference, 22_107_615);
        assert_eq!(
            result.message,
            "China has a larger population by 22,107,615 people."
        );
    }

    #[test]
    fn test_second_larger() {
        let result = compare_populations(country("Malta", 515_332), country("Japan", 125_836_021));
        assert_eq!(result.population_difference, 125_320_689);
        assert!(result.message.starts_with("Japan has a larger population"));
    }

    #[test]
    fn test_difference_is_symmetric() {
        let a = country("A", 10);
        let b = country("B", 3);
        assert_eq!(
            compare_populations(a.clone(), b.clone()).population_difference,
            compare_populations(b, a).population_difference
        );
    }

    #[test]
    fn test_tie() {
        let result = compare_populations(country("A", 500), country("B", 500));
        assert_eq!(result.population_difference, 0);
        assert_eq!(result.message, "A and B have the same population.");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(123_456), "123,456");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
