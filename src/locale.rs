use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Template locale. Picks both the section-title vocabulary and the field
/// vocabulary (month names, gender tokens, markers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Ru,
    En,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::Ru, Locale::En];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Ru => "ru",
            Locale::En => "en",
        }
    }

    pub fn vocabulary(&self) -> &'static Vocabulary {
        match self {
            Locale::Ru => &RU,
            Locale::En => &EN,
        }
    }

    pub(crate) fn whatlang(&self) -> whatlang::Lang {
        match self {
            Locale::Ru => whatlang::Lang::Rus,
            Locale::En => whatlang::Lang::Eng,
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

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ru" => Ok(Locale::Ru),
            "en" => Ok(Locale::En),
            other => Err(format!("unsupported locale: {}", other)),
        }
    }
}

/// Per-locale literals used by the field extractors and the block converter.
#[derive(Debug)]
pub struct Vocabulary {
    /// Month name forms, index 0 = January. Lowercase.
    pub months: [&'static [&'static str]; 12],
    pub genders: &'static [&'static str],
    /// Unit words that follow an age or a duration number.
    pub years_months: &'static [&'static str],
    pub born_on: &'static [&'static str],
    pub show_more: &'static str,
    /// Leading text of the site boilerplate line carrying the update stamp.
    pub updated: &'static str,
    pub willing: &'static str,
    pub own_car: &'static str,
    pub citizenship: &'static str,
    pub permission: &'static str,
    pub commute: &'static str,
    pub labels: Labels,
}

/// Display labels for the block converter.
#[derive(Debug)]
pub struct Labels {
    pub personal: &'static str,
    pub birthday: &'static str,
    pub location: &'static str,
    pub contacts: &'static str,
    pub total: &'static str,
    pub own_car: &'static str,
    pub categories: &'static str,
}

static RU: Vocabulary = Vocabulary {
    months: [
        &["январь", "января"],
        &["февраль", "февраля"],
        &["март", "марта"],
        &["апрель", "апреля"],
        &["май", "мая"],
        &["июнь", "июня"],
        &["июль", "июля"],
        &["август", "августа"],
        &["сентябрь", "сентября"],
        &["октябрь", "октября"],
        &["ноябрь", "ноября"],
        &["декабрь", "декабря"],
    ],
    genders: &["Мужчина", "Женщина"],
    years_months: &["год", "лет", "месяц"],
    born_on: &["родился", "родилась"],
    show_more: "Показать еще",
    updated: "Резюме обновлено",
    willing: "готов",
    own_car: "Имеется собственный автомобиль",
    citizenship: "Гражданство",
    permission: "Разрешение",
    commute: "Время в пути",
    labels: Labels {
        personal: "Личная информация",
        birthday: "Дата рождения",
        location: "Местоположение",
        contacts: "Контакты",
        total: "Общий стаж:",
        own_car: "Собственный автомобиль",
        categories: "Категории прав",
    },
};

static EN: Vocabulary = Vocabulary {
    months: [
        &["january"],
        &["february"],
        &["march"],
        &["april"],
        &["may"],
        &["june"],
        &["july"],
        &["august"],
        &["september"],
        &["october"],
        &["november"],
        &["december"],
    ],
    genders: &["Male", "Female"],
    years_months: &["year", "month"],
    born_on: &["born on"],
    show_more: "Show more",
    updated: "Resume updated",
    willing: "willing",
    own_car: "Having your own car",
    citizenship: "Citizenship",
    permission: "Work permit",
    commute: "Travel time",
    labels: Labels {
        personal: "Personal information",
        birthday: "Birthday",
        location: "Location",
        contacts: "Contacts",
        total: "Total experience:",
        own_car: "Own car",
        categories: "License categories",
    },
};

impl Vocabulary {
    /// Month number (1-12) for a single word, case-insensitive.
    pub fn month_number(&self, word: &str) -> Option<u32> {
        let word = word.to_lowercase();
        self.months
            .iter()
            .position(|forms| forms.iter().any(|f| *f == word))
            .map(|i| i as u32 + 1)
    }
}
