//! Column normalization and per-row validation

use crate::models::AppRole;
use crate::utils::helpers::{digits_only, normalize_email};
use super::reader::RawRow;

/// Minimum digits a mobile number must carry; the password is its tail
pub const PASSWORD_DIGITS: usize = 5;

const NAME: &[&str] = &["name", "Name", "NAME", "Full Name", "Student Name", "First Name", "FirstName"];
const MIDDLE_NAME: &[&str] = &["Middle Name", "middle_name", "MiddleName"];
const LAST_NAME: &[&str] = &["Last Name", "last_name", "LastName", "Surname"];
const EMAIL: &[&str] = &["email", "Email", "EMAIL", "Email Address", "E-mail", "Email ID", "EmailID"];
const MOBILE: &[&str] = &[
    "mobile", "Mobile", "MOBILE", "Phone", "Mobile Number", "Contact", "Phone Number", "Contact Number",
];
const ROLE: &[&str] = &["role", "Role", "ROLE", "User Role"];
const COLLEGE: &[&str] = &["college", "College", "COLLEGE", "Institution"];
const BRANCH: &[&str] = &["branch", "Branch", "BRANCH", "Department", "Stream"];
const YEAR: &[&str] = &["year", "Year", "YEAR", "Year of Study"];
const BIO: &[&str] = &["bio", "Bio", "BIO", "About", "Description"];
const LINKEDIN: &[&str] = &["linkedin_url", "LinkedIn", "linkedin", "LinkedIn URL", "LinkedIn Profile"];

/// A row with its columns mapped onto profile fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub role: Option<String>,
    pub college: Option<String>,
    pub branch: Option<String>,
    pub year: Option<String>,
    pub bio: Option<String>,
    pub linkedin_url: Option<String>,
}

/// A record that passed validation and is ready to be created
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRecord {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: AppRole,
    pub college: Option<String>,
    pub branch: Option<String>,
    pub year: Option<i32>,
    pub bio: Option<String>,
    pub linkedin_url: Option<String>,
}

/// First alias with a non-empty value wins
fn pick(row: &RawRow, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|alias| row.get(*alias))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Map a raw row onto known fields, joining first/middle/last names
pub fn normalize_record(row: &RawRow) -> ImportRecord {
    let parts: Vec<String> = [pick(row, NAME), pick(row, MIDDLE_NAME), pick(row, LAST_NAME)]
        .into_iter()
        .flatten()
        .collect();
    let name = if parts.is_empty() { None } else { Some(parts.join(" ")) };

    ImportRecord {
        name,
        email: pick(row, EMAIL),
        mobile: pick(row, MOBILE),
        role: pick(row, ROLE),
        college: pick(row, COLLEGE),
        branch: pick(row, BRANCH),
        year: pick(row, YEAR),
        bio: pick(row, BIO),
        linkedin_url: pick(row, LINKEDIN),
    }
}

/// Leading integer of a cell such as "3" or "3rd"
fn parse_year(value: &str) -> Option<i32> {
    let digits: String = value.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

impl ImportRecord {
    /// Validate the record; the error is the skip reason
    pub fn validate(&self) -> std::result::Result<ValidRecord, String> {
        let (name, email, mobile) = match (&self.name, &self.email, &self.mobile) {
            (Some(n), Some(e), Some(m)) => (n, e, m),
            _ => return Err("Missing required fields (name, email, or mobile)".to_string()),
        };

        let email = normalize_email(email);
        if !email.contains('@') {
            return Err("Invalid email format".to_string());
        }

        let digits = digits_only(mobile);
        if digits.len() < PASSWORD_DIGITS {
            return Err("Invalid mobile number".to_string());
        }
        let password = digits[digits.len() - PASSWORD_DIGITS..].to_string();

        let role = match self.role.as_deref() {
            Some(r) if r.trim().eq_ignore_ascii_case("admin") => AppRole::Admin,
            _ => AppRole::Student,
        };

        Ok(ValidRecord {
            name: name.clone(),
            email,
            password,
            role,
            college: self.college.clone(),
            branch: self.branch.clone(),
            year: self.year.as_deref().and_then(parse_year),
            bio: self.bio.clone(),
            linkedin_url: self.linkedin_url.clone(),
        })
    }
}
