// LLM prompt templates for profile extraction and gender inference.
// The wording stays in Polish: the front end, the user input and the
// model's training labels are all Polish.

/// System prompt for profile extraction. Replace `{current_year}` before sending.
pub const EXTRACTION_SYSTEM_TEMPLATE: &str = r#"Jesteś ekspertem w analizie tekstu. Twoim zadaniem jest wyciągnięcie następujących informacji z podanego tekstu:
1. Imię
2. Wiek (w latach) lub rok urodzenia
3. Płeć (M dla mężczyzny, K dla kobiety)
4. Czas na 5km (w minutach, może być w formacie MM:SS lub jako liczba minut)
Zwróć odpowiedź w formacie JSON:
{
  "name": "imię lub null",
  "age": liczba_lat lub null,
  "birth_year": rok_urodzenia lub null,
  "gender": "M" lub "K" lub null,
  "time_5k_minutes": liczba_minut lub null
}
Jeśli nie możesz określić płci z tekstu, spróbuj wywnioskować ją z imienia.
Jeśli podano czas w formacie MM:SS, przekonwertuj na minuty (np. 25:30 = 25.5).
Obecny rok: {current_year}"#;

/// User message for profile extraction. Replace `{user_input}`.
pub const EXTRACTION_USER_TEMPLATE: &str = "Tekst użytkownika: {user_input}";

pub const EXTRACTION_TEMPERATURE: f32 = 0.1;
pub const EXTRACTION_MAX_TOKENS: u32 = 200;

/// System prompt for gender inference. The model must answer with a single token.
pub const GENDER_SYSTEM: &str = "Jesteś ekspertem w rozpoznawaniu płci na podstawie imion. \
Zwróć tylko 'M' dla mężczyzny, 'K' dla kobiety lub 'NIEZNANA' jeśli nie możesz określić płci. \
Bierz pod uwagę imiona z różnych kultur i języków.";

/// User message for gender inference. Replace `{name}`.
pub const GENDER_USER_TEMPLATE: &str = "Jaką płeć ma osoba o imieniu: {name}?";

pub const GENDER_TEMPERATURE: f32 = 0.1;
pub const GENDER_MAX_TOKENS: u32 = 10;

pub fn extraction_system_prompt(current_year: i32) -> String {
    EXTRACTION_SYSTEM_TEMPLATE.replace("{current_year}", &current_year.to_string())
}

pub fn extraction_user_prompt(user_input: &str) -> String {
    EXTRACTION_USER_TEMPLATE.replace("{user_input}", user_input)
}

pub fn gender_user_prompt(name: &str) -> String {
    GENDER_USER_TEMPLATE.replace("{name}", name)
}
