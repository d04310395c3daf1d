//! Localized headings and detail labels shared by both renderers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::SectionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Pt,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Pt => "pt",
        }
    }

    pub fn labels(&self) -> &'static Labels {
        match self {
            Locale::En => &EN,
            Locale::Pt => &PT,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    /// Accepts bare languages and regional tags (`pt-BR`, `en_US`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lang = s
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match lang.as_str() {
            "en" => Ok(Locale::En),
            "pt" => Ok(Locale::Pt),
            _ => Err(format!("unsupported locale '{s}'")),
        }
    }
}

pub struct Labels {
    pub personal: &'static str,
    pub experience: &'static str,
    pub internships: &'static str,
    pub education: &'static str,
    pub skills: &'static str,
    pub languages: &'static str,
    pub certificates: &'static str,
    pub references: &'static str,
    pub summary: &'static str,
    pub contact: &'static str,
    pub birth_date: &'static str,
    pub civil_status: &'static str,
    pub gender: &'static str,
    pub nationality: &'static str,
    pub present: &'static str,
    pub role_placeholder: &'static str,
    pub signature: &'static str,
    pub months: [&'static str; 12],
}

impl Labels {
    pub fn heading(&self, section: SectionId) -> &'static str {
        match section {
            SectionId::Personal => self.personal,
            SectionId::Experience => self.experience,
            SectionId::Internships => self.internships,
            SectionId::Education => self.education,
            SectionId::Skills => self.skills,
            SectionId::Languages => self.languages,
            SectionId::Certificates => self.certificates,
            SectionId::References => self.references,
        }
    }
}

static EN: Labels = Labels {
    personal: "Personal Details",
    experience: "Experience",
    internships: "Internships",
    education: "Education",
    skills: "Skills",
    languages: "Languages",
    certificates: "Certificates",
    references: "References",
    summary: "Profile",
    contact: "Contact",
    birth_date: "Date of Birth",
    civil_status: "Marital Status",
    gender: "Gender",
    nationality: "Nationality",
    present: "Present",
    role_placeholder: "Professional Title",
    signature: "Signature",
    months: [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ],
};

static PT: Labels = Labels {
    personal: "Dados Pessoais",
    experience: "Experiência Profissional",
    internships: "Estágios",
    education: "Formação Académica",
    skills: "Competências",
    languages: "Idiomas",
    certificates: "Certificados",
    references: "Referências",
    summary: "Perfil",
    contact: "Contacto",
    birth_date: "Data de Nascimento",
    civil_status: "Estado Civil",
    gender: "Género",
    nationality: "Nacionalidade",
    present: "Atualmente",
    role_placeholder: "Cargo Profissional",
    signature: "Assinatura",
    months: [
        "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_parses_regional_tags() {
        assert_eq!("pt-BR".parse::<Locale>().unwrap(), Locale::Pt);
        assert_eq!("en_US".parse::<Locale>().unwrap(), Locale::En);
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_every_section_has_a_heading() {
        for locale in [Locale::En, Locale::Pt] {
            for id in SectionId::ALL {
                assert!(!locale.labels().heading(id).is_empty());
            }
        }
    }
}
