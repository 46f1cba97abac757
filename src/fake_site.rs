// A scripted copy of the careers flow on top of `FakeDriver`: homepage with
// cookie banner and footer link, careers page, and a Lever board with four
// filter dropdowns, posting cards and team headers.

#![allow(dead_code)]

use crate::fake_driver::{Effect, FakeDriver, FakeElement};
use crate::pages::careers::{
    APPLY_BTN, CareersPage, EXPLORE_OPEN_ROLES_BTN, JOB_GROUP_TITLE, JOB_ITEM, JOB_LOCATION,
    JOB_TITLE, SOFTWARE_DEV_LINK,
};
use crate::pages::home::{COOKIE_ACCEPT_BTN, HOME_URL, WE_ARE_HIRING_LINK};

pub const CAREERS_URL: &str = "https://insiderone.com/careers/";
pub const BOARD_URL: &str = "https://jobs.lever.co/insiderone?team=Software%20Development";
pub const APPLY_URL: &str = "https://jobs.lever.co/insiderone/4f1c2a/apply";

pub struct Dropdown {
    pub button: FakeElement,
    pub popup: FakeElement,
    pub options: Vec<FakeElement>,
}

pub struct Card {
    pub card: FakeElement,
    pub title: FakeElement,
    pub location: FakeElement,
    pub apply: Option<FakeElement>,
}

pub struct Site {
    pub driver: FakeDriver,
    pub cookie: FakeElement,
    pub hiring: FakeElement,
    pub explore: FakeElement,
    pub software: FakeElement,
    pub dropdowns: Vec<Dropdown>,
    pub cards: Vec<Card>,
    pub groups: Vec<FakeElement>,
}

/// Wrapper with a toggle button and a hidden popup; choosing an option
/// writes its label into the button and closes the popup
pub fn add_dropdown(driver: &FakeDriver, label: &str, options: &[&str]) -> Dropdown {
    let widget = CareersPage::<FakeDriver>::filter_widget();
    let wrapper = driver.add_bound(&widget.wrapper, "");
    let button = driver.add_within(wrapper, &widget.button, label);
    let popup = driver.add_within(wrapper, &widget.popup, "");
    driver.update(popup, |n| n.displayed = false);
    driver.on_click(button, vec![Effect::Toggle(popup)]);

    let options = options
        .iter()
        .map(|text| {
            let option = driver.add_within(popup, &widget.option, text);
            driver.on_click(
                option,
                vec![
                    Effect::SetText(button, text.to_string()),
                    Effect::Hide(popup),
                ],
            );
            option
        })
        .collect();

    Dropdown {
        button,
        popup,
        options,
    }
}

impl Site {
    /// Homepage loaded; two Istanbul QA postings on the board
    pub fn new() -> Self {
        let mut site = Self::without_postings();
        site.add_card("Senior QA Engineer", "Istanbul, Turkiye");
        site.add_card("QA Automation Engineer", "Istanbul, Turkiye");
        site
    }

    /// Same site with an empty board; add cards in page order
    pub fn without_postings() -> Self {
        let driver = FakeDriver::new(HOME_URL, "Insider One | AI-native Omnichannel Experience");

        let cookie = driver.add_bound(&COOKIE_ACCEPT_BTN, "Accept All");
        driver.on_click(cookie, vec![Effect::Hide(cookie)]);

        let hiring = driver.add_bound(&WE_ARE_HIRING_LINK, "We're hiring");
        driver.on_click(
            hiring,
            vec![Effect::Navigate(
                CAREERS_URL.to_string(),
                "Careers | Insider One".to_string(),
            )],
        );

        let explore = driver.add_bound(&EXPLORE_OPEN_ROLES_BTN, "Explore open roles");

        let software = driver.add_bound(&SOFTWARE_DEV_LINK, "Software Development");
        driver.set_attribute(software, "href", BOARD_URL);
        driver.on_click(
            software,
            vec![Effect::Navigate(
                BOARD_URL.to_string(),
                "Insider One - Jobs".to_string(),
            )],
        );

        let dropdowns = vec![
            add_dropdown(&driver, "Location type", &["On-site", "Remote"]),
            add_dropdown(
                &driver,
                "Location",
                &["Istanbul, Turkiye (Remote)", "Istanbul, Turkiye", "London"],
            ),
            add_dropdown(&driver, "Team", &["Quality Assurance", "Software Development"]),
            add_dropdown(&driver, "Work type", &["Full-time", "Contract"]),
        ];

        let groups = vec![driver.add_bound(&JOB_GROUP_TITLE, "Quality Assurance")];

        Self {
            driver,
            cookie,
            hiring,
            explore,
            software,
            dropdowns,
            cards: Vec::new(),
            groups,
        }
    }

    pub fn add_card(&mut self, title: &str, location: &str) -> usize {
        let driver = &self.driver;
        let card = driver.add_bound(&JOB_ITEM, "");
        let title = driver.add_within(card, &JOB_TITLE, title);
        let location = driver.add_within(card, &JOB_LOCATION, location);
        let apply = driver.add_within(card, &APPLY_BTN, "Apply");
        driver.set_attribute(apply, "href", APPLY_URL);
        driver.on_click(apply, vec![Effect::OpenWindow(APPLY_URL.to_string())]);

        self.cards.push(Card {
            card,
            title,
            location,
            apply: Some(apply),
        });
        self.cards.len() - 1
    }

    /// Card without an Apply link
    pub fn add_bare_card(&mut self, title: &str, location: &str) -> usize {
        let driver = &self.driver;
        let card = driver.add_bound(&JOB_ITEM, "");
        let title = driver.add_within(card, &JOB_TITLE, title);
        let location = driver.add_within(card, &JOB_LOCATION, location);

        self.cards.push(Card {
            card,
            title,
            location,
            apply: None,
        });
        self.cards.len() - 1
    }
}
