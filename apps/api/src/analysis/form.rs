//! Interactive terminal form: one profile per line on stdin, results on stdout.

use std::io::Write as _;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::analysis::pipeline::{current_year, Analysis, Analyzer};
use crate::errors::AppError;
use crate::prediction::format::five_k_pace;
use crate::profile::models::ExtractedProfile;
use crate::profile::resolution::missing_labels;
use crate::profile::time::parse_time_5k;

const INTRO: &str = "\
Predyktor Czasu Półmaratonu

Opowiedz o sobie. Podaj w dowolnej formie: imię, wiek, czas na 5km, płeć (jeśli chcesz).
Przykłady:
  - Nazywam się Kasia, urodziłam się w 1990 roku, 5km w 26.5 minuty
  - Jestem Anna, mam 28 lat i biegam 5km w 24 minuty
  - Marek, 35 lat, czas na 5km: 22:45
  - Możesz też po prostu \"Janek 75 25\"  :)
Pusta linia powtarza pytanie, Ctrl-D kończy.";

const EMPTY_LINE_MESSAGE: &str = "Proszę podać informacje o sobie!";
const NOT_RECOGNISED: &str = "nie rozpoznano";

/// Runs the form until stdin is closed.
pub async fn run_form(analyzer: &Analyzer) -> Result<()> {
    println!("{INTRO}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\n> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            println!("{EMPTY_LINE_MESSAGE}");
            continue;
        }

        let rendered = match analyzer.analyze(&line, current_year()).await {
            Ok(analysis) => render_analysis(&analysis),
            Err(e) => render_failure(&e),
        };
        println!("{rendered}");
    }

    Ok(())
}

/// Extracted fields, predicted time and pace analysis.
pub fn render_analysis(analysis: &Analysis) -> String {
    let resolved = &analysis.resolved;
    let prediction = &analysis.prediction;

    let age = if resolved.age_from_birth_year {
        format!("{} lat (ur. {})", resolved.age, resolved.birth_year)
    } else {
        format!("{} lat", resolved.age)
    };
    let inferred = if analysis.gender_inferred {
        " (z imienia)"
    } else {
        ""
    };

    format!(
        "Dane wyciągnięte przez AI:\n\
         \x20 Imię: {name}\n\
         \x20 Wiek: {age}\n\
         \x20 Płeć: {gender}{inferred}\n\
         \x20 5km: {time_5k} min\n\
         \n\
         Przewidywany czas półmaratonu: {formatted}\n\
         Tempo na km: {pace} min/km\n\
         Tempo 5km: {pace_5k} min/km",
        name = resolved.name,
        gender = resolved.gender.display_name(),
        time_5k = resolved.time_5k_minutes,
        formatted = prediction.formatted,
        pace = prediction.pace_per_km,
        pace_5k = five_k_pace(resolved.time_5k_minutes),
    )
}

/// User-facing rendering of a failed request.
pub fn render_failure(error: &AppError) -> String {
    match error {
        AppError::MissingFields { missing, data } => format!(
            "{}\nBrakuje następujących danych: {}\n\
             Spróbuj podać informacje w bardziej szczegółowy sposób lub w innym formacie.",
            render_partial(data),
            missing_labels(missing)
        ),
        other => other.user_message(),
    }
}

fn render_partial(profile: &ExtractedProfile) -> String {
    let name = profile.name.as_deref().unwrap_or(NOT_RECOGNISED);
    let age = match (profile.age, profile.birth_year) {
        (Some(age), _) if age > 0 => format!("Wiek: {age} lat"),
        (_, Some(year)) => format!("Rok urodzenia: {year}"),
        _ => format!("Wiek: {NOT_RECOGNISED}"),
    };
    let gender = profile
        .gender
        .map(|g| g.display_name())
        .unwrap_or(NOT_RECOGNISED);
    let time_5k = match profile.time_5k_minutes.as_ref().and_then(parse_time_5k) {
        Some(minutes) => format!("5km: {minutes} min"),
        None => format!("Czas 5km: {NOT_RECOGNISED}"),
    };

    format!(
        "Dane wyciągnięte przez AI:\n  Imię: {name}\n  {age}\n  Płeć: {gender}\n  {time_5k}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::models::Gender;
    use crate::profile::resolution::MissingField;
    use crate::test_support::analyzer_with;

    #[tokio::test]
    async fn test_render_analysis_for_marek() {
        let reply = r#"{"name": "Marek", "age": 35, "gender": null, "time_5k_minutes": 22.75}"#;
        let (analyzer, _, _, _) =
            analyzer_with(vec![Ok(reply.to_string()), Ok("M".to_string())], 6400.0);
        let analysis = analyzer
            .analyze("Marek, 35 lat, czas na 5km: 22:45", 2026)
            .await
            .unwrap();

        let rendered = render_analysis(&analysis);
        assert!(rendered.contains("Imię: Marek"));
        assert!(rendered.contains("Wiek: 35 lat\n"));
        assert!(rendered.contains("Płeć: Mężczyzna (z imienia)"));
        assert!(rendered.contains("5km: 22.75 min"));
        assert!(rendered.contains("Przewidywany czas półmaratonu: 01:46:40"));
        assert!(rendered.contains("Tempo na km: 5:03 min/km"));
        assert!(rendered.ends_with("Tempo 5km: 4:33 min/km"));
    }

    #[tokio::test]
    async fn test_render_analysis_shows_birth_year_when_age_derived() {
        let reply = r#"{"name": "Kasia", "birth_year": 1990, "gender": "K", "time_5k_minutes": 26.5}"#;
        let (analyzer, _, _, _) = analyzer_with(vec![Ok(reply.to_string())], 7500.0);
        let analysis = analyzer.analyze("Kasia 1990 26.5", 2026).await.unwrap();

        let rendered = render_analysis(&analysis);
        assert!(rendered.contains("Wiek: 36 lat (ur. 1990)"));
        assert!(rendered.contains("Płeć: Kobieta\n"));
    }

    #[test]
    fn test_render_failure_lists_missing_and_partial_data() {
        let error = AppError::MissingFields {
            missing: vec![MissingField::Age, MissingField::Gender],
            data: Box::new(ExtractedProfile {
                name: Some("Alex".to_string()),
                time_5k_minutes: Some(crate::profile::models::RawTime::Minutes(25.0)),
                ..Default::default()
            }),
        };
        let rendered = render_failure(&error);
        assert!(rendered.contains("Imię: Alex"));
        assert!(rendered.contains("Wiek: nie rozpoznano"));
        assert!(rendered.contains("Płeć: nie rozpoznano"));
        assert!(rendered.contains("5km: 25 min"));
        assert!(rendered.contains("Brakuje następujących danych: wiek, płeć"));
    }

    #[test]
    fn test_render_failure_other_errors_use_user_message() {
        let error = AppError::Validation(crate::errors::EMPTY_INPUT_MESSAGE.to_string());
        assert_eq!(render_failure(&error), "Brak tekstu wejściowego");
        assert_eq!(Gender::Female.display_name(), "Kobieta");
    }
}
