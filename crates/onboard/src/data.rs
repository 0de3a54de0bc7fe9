//! Test data for registration runs.
//!
//! Every run registers a fresh identity: names and addresses come from small
//! Finnish pools, everything the backend validates (email uniqueness, IBAN,
//! business id) is built to pass its check.

use crate::picker::DateField;
use crate::result::{OnboardError, OnboardResult};
use chrono::{DateTime, Datelike, Local, Months, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// PIN used for every generated account
pub const DEFAULT_PIN: &str = "Test7@";

/// Country calling code of generated phone numbers
pub const COUNTRY_CODE: &str = "358";

const FIRST_NAMES: &[&str] = &[
    "Aino", "Eino", "Helmi", "Väinö", "Sofia", "Onni", "Aada", "Leevi", "Emma", "Elias",
];

const LAST_NAMES: &[&str] = &[
    "Korhonen",
    "Virtanen",
    "Mäkinen",
    "Nieminen",
    "Mäkelä",
    "Hämäläinen",
    "Laine",
    "Heikkinen",
    "Koskinen",
    "Järvinen",
];

const STREETS: &[&str] = &[
    "Mannerheimintie",
    "Aleksanterinkatu",
    "Hämeenkatu",
    "Runeberginkatu",
    "Fredrikinkatu",
    "Kauppakatu",
    "Puistokatu",
    "Rantatie",
];

/// (city, postal code)
const CITIES: &[(&str, &str)] = &[
    ("Helsinki", "00100"),
    ("Espoo", "02100"),
    ("Vantaa", "01300"),
    ("Tampere", "33100"),
    ("Turku", "20100"),
    ("Oulu", "90100"),
    ("Jyväskylä", "40100"),
];

/// Business types offered by the partner form
pub const BUSINESS_TYPES: &[&str] = &[
    "Toiminimi",
    "Osakeyhtiö",
    "Avoin yhtiö",
    "Kommandiittiyhtiö",
    "Osuuskunta",
];

const Y_TUNNUS_WEIGHTS: [u32; 7] = [7, 9, 10, 5, 8, 4, 2];

// =============================================================================
// ROLE
// =============================================================================

/// Account type chosen on the first registration screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    /// Orders deliveries
    #[default]
    Client,
    /// Delivers; also registers a bank account and pricing
    Service,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Client => "Client",
            Self::Service => "Service",
        })
    }
}

impl FromStr for Role {
    type Err = OnboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "service" => Ok(Self::Service),
            other => Err(OnboardError::invalid_data(format!("unknown role \"{other}\""))),
        }
    }
}

// =============================================================================
// DATE OF BIRTH
// =============================================================================

fn date_pattern() -> OnboardResult<&'static Regex> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(\d{2})/(\d{2})/(\d{4})$"))
        .as_ref()
        .map_err(|e| OnboardError::invalid_data(e.to_string()))
}

/// A calendar date entered as `DD/MM/YYYY`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateOfBirth {
    year: i32,
    month: u32,
    day: u32,
}

impl DateOfBirth {
    /// Create a date, rejecting impossible ones.
    ///
    /// # Errors
    ///
    /// `InvalidData` for dates that do not exist (31/02, 00/01).
    pub fn new(day: u32, month: u32, year: i32) -> OnboardResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self::from)
            .ok_or_else(|| {
                OnboardError::invalid_data(format!("{day:02}/{month:02}/{year:04} is not a date"))
            })
    }

    /// Parse `DD/MM/YYYY`.
    ///
    /// # Errors
    ///
    /// `InvalidData` if the text is not in that form or names no real date.
    pub fn parse(text: &str) -> OnboardResult<Self> {
        let caps = date_pattern()?.captures(text.trim()).ok_or_else(|| {
            OnboardError::invalid_data(format!("\"{text}\" is not in DD/MM/YYYY form"))
        })?;
        let number = |i: usize| caps[i].parse::<u32>().unwrap_or_default();
        let year = i32::try_from(number(3)).unwrap_or_default();
        Self::new(number(1), number(2), year)
    }

    /// Day of month
    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Month (1-12)
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Year
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Value shown on the given picker dial
    #[must_use]
    pub fn get(&self, field: DateField) -> i32 {
        match field {
            DateField::Day => i32::try_from(self.day).unwrap_or_default(),
            DateField::Month => i32::try_from(self.month).unwrap_or_default(),
            DateField::Year => self.year,
        }
    }

    /// Completed years of age on `today`
    #[must_use]
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        let mut age = today.year() - self.year;
        if (today.month(), today.day()) < (self.month, self.day) {
            age -= 1;
        }
        age
    }
}

impl From<NaiveDate> for DateOfBirth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl fmt::Display for DateOfBirth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{:04}", self.day, self.month, self.year)
    }
}

impl FromStr for DateOfBirth {
    type Err = OnboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DateOfBirth {
    type Error = OnboardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DateOfBirth> for String {
    fn from(date: DateOfBirth) -> Self {
        date.to_string()
    }
}

// =============================================================================
// GENERATORS
// =============================================================================

/// `qa{HHmmss}@example.com`
#[must_use]
pub fn unique_email(at: DateTime<Local>) -> String {
    format!("qa{}@example.com", at.format("%H%M%S"))
}

/// `358` + operator prefix 40-50 + seven digits, without a leading `+`
pub fn phone_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    let prefix: u32 = rng.gen_range(40..=50);
    let suffix: u32 = rng.gen_range(1_000_000..=9_999_999);
    format!("{COUNTRY_CODE}{prefix}{suffix}")
}

/// Number as typed into a form that shows `+358` as a fixed prefix
#[must_use]
pub fn local_phone_number(phone: &str) -> &str {
    phone.strip_prefix(COUNTRY_CODE).unwrap_or(phone)
}

fn years_before(date: NaiveDate, years: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(12 * years))
        .unwrap_or(NaiveDate::MIN)
}

/// A birth date giving an age between 18 and 60 on `today`
pub fn date_of_birth<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> DateOfBirth {
    let latest = years_before(today, 18);
    let earliest = years_before(today, 61)
        .succ_opt()
        .unwrap_or(latest);
    let span = (latest - earliest).num_days().max(0);
    let offset = rng.gen_range(0..=span);
    DateOfBirth::from(earliest + chrono::Duration::days(offset))
}

/// ISO 7064 mod-97 remainder of a digit/letter string
fn mod97(text: &str) -> u32 {
    text.chars().fold(0, |acc, c| match c.to_digit(36) {
        Some(v) if v >= 10 => (acc * 100 + v) % 97,
        Some(v) => (acc * 10 + v) % 97,
        None => acc,
    })
}

/// A Finnish IBAN (`FI` + check digits + 14-digit BBAN)
pub fn finnish_iban<R: Rng + ?Sized>(rng: &mut R) -> String {
    let bban: String = (0..14)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();
    let check = 98 - mod97(&format!("{bban}FI00"));
    format!("FI{check:02}{bban}")
}

/// Whether an IBAN carries a valid mod-97 check
#[must_use]
pub fn iban_is_valid(iban: &str) -> bool {
    let compact: String = iban.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() < 5 || !compact.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }
    let (head, tail) = compact.split_at(4);
    mod97(&format!("{tail}{head}").to_ascii_uppercase()) == 1
}

fn y_tunnus_check(digits: &[u32; 7]) -> Option<u32> {
    let sum: u32 = digits
        .iter()
        .zip(Y_TUNNUS_WEIGHTS)
        .map(|(d, w)| d * w)
        .sum();
    match sum % 11 {
        0 => Some(0),
        1 => None,
        rem => Some(11 - rem),
    }
}

/// A Finnish business id (`NNNNNNN-C`) with a valid check digit
pub fn business_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    loop {
        let mut digits = [0u32; 7];
        for d in &mut digits {
            *d = rng.gen_range(0..10);
        }
        digits[0] = rng.gen_range(1..10);
        if let Some(check) = y_tunnus_check(&digits) {
            let body: String = digits.iter().map(u32::to_string).collect();
            return format!("{body}-{check}");
        }
    }
}

/// Whether a business id is well formed with a correct check digit
#[must_use]
pub fn business_id_is_valid(id: &str) -> bool {
    let Some((body, check)) = id.split_once('-') else {
        return false;
    };
    if body.len() != 7 || check.len() != 1 {
        return false;
    }
    let mut digits = [0u32; 7];
    for (slot, c) in digits.iter_mut().zip(body.chars()) {
        match c.to_digit(10) {
            Some(d) => *slot = d,
            None => return false,
        }
    }
    check.chars().next().and_then(|c| c.to_digit(10)) == y_tunnus_check(&digits)
}

fn pick<R: Rng + ?Sized>(rng: &mut R, pool: &[&'static str]) -> &'static str {
    pool.choose(rng).copied().unwrap_or_default()
}

/// Street, city and postal code of a Finnish address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street and number
    pub street: String,
    /// City
    pub city: String,
    /// Five-digit postal code
    pub postal_code: String,
}

impl Address {
    /// A random address from the Finnish pools
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let (city, postal_code) = CITIES.choose(rng).copied().unwrap_or(("Helsinki", "00100"));
        Self {
            street: format!("{} {}", pick(rng, STREETS), rng.gen_range(1..=120)),
            city: city.to_string(),
            postal_code: postal_code.to_string(),
        }
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// One account to register in the app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Login email
    pub email: String,
    /// International number without `+`
    pub phone: String,
    /// Date of birth
    pub date_of_birth: DateOfBirth,
    /// Account type
    pub role: Role,
    /// Login PIN
    pub pin: String,
    /// IBAN (service accounts only use it)
    pub account_number: String,
    /// Street and number
    pub street: String,
    /// Second address line
    pub additional_address: String,
    /// City
    pub city: String,
    /// Postal code
    pub postal_code: String,
}

impl UserData {
    /// A fresh valid user drawn from `rng` at time `now`
    pub fn generate<R: Rng + ?Sized>(role: Role, rng: &mut R, now: DateTime<Local>) -> Self {
        let address = Address::generate(rng);
        Self {
            first_name: pick(rng, FIRST_NAMES).to_string(),
            last_name: pick(rng, LAST_NAMES).to_string(),
            email: unique_email(now),
            phone: phone_number(rng),
            date_of_birth: date_of_birth(rng, now.date_naive()),
            role,
            pin: DEFAULT_PIN.to_string(),
            account_number: finnish_iban(rng),
            street: address.street,
            additional_address: String::new(),
            city: address.city,
            postal_code: address.postal_code,
        }
    }

    /// A fresh valid user for this run
    #[must_use]
    pub fn valid(role: Role) -> Self {
        Self::generate(role, &mut rand::thread_rng(), Local::now())
    }

    fn invalid(email: &str) -> Self {
        Self {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            phone: "+15551234567".to_string(),
            date_of_birth: DateOfBirth {
                year: 1990,
                month: 1,
                day: 1,
            },
            role: Role::Client,
            pin: DEFAULT_PIN.to_string(),
            account_number: "FI0000000000000000".to_string(),
            street: "123 Test St".to_string(),
            additional_address: String::new(),
            city: "Testville".to_string(),
            postal_code: "00100".to_string(),
        }
    }
}

/// Named users the registration form must reject
#[must_use]
pub fn invalid_users() -> BTreeMap<&'static str, UserData> {
    BTreeMap::from([
        ("empty_email", UserData::invalid("")),
        ("invalid_email_format", UserData::invalid("not-a-valid-email")),
    ])
}

/// One partner company to sign up on the portal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerData {
    /// Y-tunnus
    pub business_id: String,
    /// Entry of the business type `<select>`
    pub business_type: String,
    /// Street address
    pub address: String,
    /// Postal code
    pub postal_code: String,
    /// City
    pub city: String,
    /// Country to pick in the country dropdown; the form defaults to Finland
    #[serde(default)]
    pub country: Option<String>,
    /// Contact person given name
    pub first_name: String,
    /// Contact person family name
    pub last_name: String,
    /// Contact mobile, international form without `+`
    pub mobile: String,
    /// Contact email
    pub email: String,
}

impl PartnerData {
    /// A fresh valid partner drawn from `rng` at time `now`
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Local>) -> Self {
        let address = Address::generate(rng);
        Self {
            business_id: business_id(rng),
            business_type: pick(rng, BUSINESS_TYPES).to_string(),
            address: address.street,
            postal_code: address.postal_code,
            city: address.city,
            country: None,
            first_name: pick(rng, FIRST_NAMES).to_string(),
            last_name: pick(rng, LAST_NAMES).to_string(),
            mobile: phone_number(rng),
            email: unique_email(now),
        }
    }

    /// A fresh valid partner for this run
    #[must_use]
    pub fn valid() -> Self {
        Self::generate(&mut rand::thread_rng(), Local::now())
    }
}
