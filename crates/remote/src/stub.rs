//! In-process stub implementation of the provisioning service.
//!
//! Backs the CLI's `--stub` mode and the integration tests: deterministic
//! answers, no network. Search filters the built-in table by district and
//! meal tag; rank weights the caller's preferred categories first and
//! review sentiment second.

use async_trait::async_trait;
use tripweaver_core::{
    ProvisionTransport, ProvisionedItem, RankRequest, Ranking, RemoteError, SearchRequest,
    Sentiment, WeekdayHours,
};

/// Deterministic provisioning service seeded from a built-in table.
pub struct StubProvisionTransport {
    items: Vec<ProvisionedItem>,
}

impl StubProvisionTransport {
    /// Stub over the built-in restaurant table.
    pub fn new() -> Self {
        Self {
            items: builtin_items(),
        }
    }

    /// Stub over a caller-supplied table.
    pub fn from_items(items: Vec<ProvisionedItem>) -> Self {
        Self { items }
    }
}

impl Default for StubProvisionTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProvisionTransport for StubProvisionTransport {
    fn name(&self) -> &str {
        "provisions-stub"
    }

    async fn search(&self, request: SearchRequest) -> Result<Vec<ProvisionedItem>, RemoteError> {
        let matches = self
            .items
            .iter()
            .filter(|item| item.has_category(request.meal.as_str()))
            .filter(|item| {
                request.districts.is_empty()
                    || request
                        .districts
                        .iter()
                        .any(|d| d.eq_ignore_ascii_case(&item.district))
            })
            .cloned()
            .collect();
        Ok(matches)
    }

    async fn rank(&self, request: RankRequest) -> Result<Ranking, RemoteError> {
        if request.items.is_empty() {
            return Err(RemoteError::Unknown("no items to rank".into()));
        }

        let mut ranked = request.items;
        ranked.sort_by(|a, b| {
            let pref_a = preference_index(a, &request.preferred_categories);
            let pref_b = preference_index(b, &request.preferred_categories);
            pref_a
                .cmp(&pref_b)
                .then_with(|| {
                    b.sentiment
                        .positive_ratio()
                        .total_cmp(&a.sentiment.positive_ratio())
                })
        });

        let top = ranked.remove(0);
        Ok(Ranking {
            top,
            runner_ups: ranked,
        })
    }
}

/// Position of the item's best matching category in the preference list;
/// items matching nothing sort after all matches.
fn preference_index(item: &ProvisionedItem, preferred: &[String]) -> usize {
    preferred
        .iter()
        .position(|category| item.has_category(category))
        .unwrap_or(usize::MAX)
}

fn item(
    id: &str,
    name: &str,
    address: &str,
    district: &str,
    hours: WeekdayHours,
    categories: &[&str],
    sentiment: (u32, u32, u32),
) -> ProvisionedItem {
    ProvisionedItem {
        id: id.into(),
        name: name.into(),
        address: address.into(),
        district: district.into(),
        weekday_hours: hours,
        categories: categories.iter().map(|c| (*c).to_string()).collect(),
        sentiment: Sentiment {
            positive: sentiment.0,
            negative: sentiment.1,
            neutral: sentiment.2,
        },
    }
}

fn builtin_items() -> Vec<ProvisionedItem> {
    let all_day = WeekdayHours::daily(&["06:30-21:30"]);
    let lunch_dinner = WeekdayHours::daily(&["11:00-14:30", "17:00-21:30"]);
    let evening = WeekdayHours::daily(&["17:00-23:30"]);
    let morning = WeekdayHours::daily(&["06:00-13:30"]);

    // A split-service house that rests on Mondays.
    let mut closed_monday = lunch_dinner.clone();
    closed_monday.mon = vec![];

    vec![
        item(
            "prov-001",
            "Fuhang Soy Milk",
            "108 Zhongxiao E Rd Sec 1",
            "Zhongzheng",
            morning.clone(),
            &["breakfast", "street_food", "bakery"],
            (1860, 120, 240),
        ),
        item(
            "prov-002",
            "Yongkang Beef Noodle",
            "17 Jinshan S Rd Sec 2",
            "Da'an",
            lunch_dinner.clone(),
            &["lunch", "dinner", "noodle_shop"],
            (1420, 180, 260),
        ),
        item(
            "prov-003",
            "Din Tai Fung Xinyi",
            "194 Xinyi Rd Sec 2",
            "Da'an",
            lunch_dinner.clone(),
            &["lunch", "dinner", "dumpling_house", "fine_dining"],
            (2310, 140, 300),
        ),
        item(
            "prov-004",
            "Raohe Pepper Buns",
            "249 Raohe St",
            "Songshan",
            evening.clone(),
            &["dinner", "street_food", "bbq"],
            (980, 75, 160),
        ),
        item(
            "prov-005",
            "Wisteria Tea House",
            "1 Xinsheng S Rd Sec 3",
            "Da'an",
            all_day.clone(),
            &["breakfast", "lunch", "tea_house", "vegetarian"],
            (640, 40, 90),
        ),
        item(
            "prov-006",
            "Addiction Aquatic Market",
            "18 Alley 2, Minzu E Rd",
            "Zhongshan",
            lunch_dinner.clone(),
            &["lunch", "dinner", "seafood"],
            (1710, 210, 270),
        ),
        item(
            "prov-007",
            "Mume",
            "28 Siwei Rd",
            "Da'an",
            evening.clone(),
            &["dinner", "fine_dining"],
            (860, 95, 70),
        ),
        item(
            "prov-008",
            "Ningxia Night Market Stalls",
            "Ningxia Rd",
            "Datong",
            evening.clone(),
            &["dinner", "street_food", "dessert"],
            (1230, 130, 210),
        ),
        item(
            "prov-009",
            "Sung Kitchen",
            "32 Yongkang St",
            "Da'an",
            closed_monday,
            &["lunch", "dinner", "hot_pot"],
            (540, 60, 80),
        ),
        item(
            "prov-010",
            "Good Cho's",
            "54 Songqin St",
            "Xinyi",
            morning.clone(),
            &["breakfast", "brunch", "cafe", "bakery"],
            (720, 55, 110),
        ),
        item(
            "prov-011",
            "Shilin Sausage Grill",
            "101 Jihe Rd",
            "Shilin",
            evening.clone(),
            &["dinner", "street_food", "bbq"],
            (880, 140, 150),
        ),
        item(
            "prov-012",
            "Beitou Spring Bento",
            "7 Zhongshan Rd",
            "Beitou",
            all_day.clone(),
            &["lunch", "bento"],
            (410, 35, 60),
        ),
        item(
            "prov-013",
            "Yangming Vegetarian Hall",
            "219 Gezhi Rd",
            "Shilin",
            lunch_dinner.clone(),
            &["lunch", "dinner", "vegetarian"],
            (390, 25, 45),
        ),
        item(
            "prov-014",
            "Songshan Izakaya Lane",
            "22 Bade Rd Sec 4",
            "Songshan",
            evening,
            &["dinner", "izakaya"],
            (650, 85, 95),
        ),
        item(
            "prov-015",
            "Datong Congee House",
            "41 Dihua St",
            "Datong",
            morning,
            &["breakfast", "street_food"],
            (560, 50, 85),
        ),
        item(
            "prov-016",
            "Elephant Mountain Coffee",
            "11 Songren Rd",
            "Xinyi",
            all_day,
            &["breakfast", "lunch", "cafe", "brunch", "dessert"],
            (830, 70, 120),
        ),
    ]
}
