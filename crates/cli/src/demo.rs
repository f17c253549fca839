//! Built-in demo activity pool.
//!
//! Stands in for the upstream knowledge-base query so `tripweaver plan`
//! runs end-to-end without any external service. Trait-match flags are
//! computed against the profile's preferred categories, the same contract
//! the real query honors, and matched candidates are ordered first.

use tripweaver_core::{Activity, TraitProfile};

fn attraction(
    id: &str,
    name: &str,
    address: &str,
    district: &str,
    area: &str,
    hours: &str,
    days: &str,
    category: &str,
) -> Activity {
    Activity {
        id: id.into(),
        name: name.into(),
        address: address.into(),
        district: district.into(),
        area: area.into(),
        hours: hours.into(),
        days: days.into(),
        category: category.into(),
        trait_matched: false,
    }
}

fn attractions() -> Vec<Activity> {
    vec![
        attraction(
            "act-001",
            "Longshan Temple",
            "211 Guangzhou St",
            "Wanhua",
            "west",
            "06:00-22:00",
            "daily",
            "temple",
        ),
        attraction(
            "act-002",
            "National Palace Museum",
            "221 Zhishan Rd Sec 2",
            "Shilin",
            "north",
            "09:00-17:00",
            "Tue-Sun",
            "museum",
        ),
        attraction(
            "act-003",
            "Taipei 101 Observatory",
            "7 Xinyi Rd Sec 5",
            "Xinyi",
            "east",
            "10:00-21:00",
            "daily",
            "observatory",
        ),
        attraction(
            "act-004",
            "Shilin Night Market",
            "101 Jihe Rd",
            "Shilin",
            "north",
            "16:00-00:00",
            "daily",
            "night_market",
        ),
        attraction(
            "act-005",
            "Chiang Kai-shek Memorial Hall",
            "21 Zhongshan S Rd",
            "Zhongzheng",
            "west",
            "09:00-18:00",
            "daily",
            "memorial_hall",
        ),
        attraction(
            "act-006",
            "Elephant Mountain Trail",
            "Alley 342, Songren Rd",
            "Xinyi",
            "east",
            "24 hours",
            "daily",
            "nature_trail",
        ),
        attraction(
            "act-007",
            "Beitou Hot Spring Valley",
            "Zhongshan Rd",
            "Beitou",
            "north",
            "09:00-17:00",
            "Tue-Sun",
            "hot_spring",
        ),
        attraction(
            "act-008",
            "Huashan 1914 Creative Park",
            "1 Bade Rd Sec 1",
            "Zhongzheng",
            "west",
            "09:30-21:00",
            "daily",
            "cultural_center",
        ),
        attraction(
            "act-009",
            "Fine Arts Museum",
            "181 Zhongshan N Rd Sec 3",
            "Zhongshan",
            "central",
            "09:30-17:30",
            "Tue-Sun",
            "art_gallery",
        ),
        attraction(
            "act-010",
            "Raohe Street Night Market",
            "Raohe St",
            "Songshan",
            "east",
            "17:00-23:00",
            "daily",
            "night_market",
        ),
        attraction(
            "act-011",
            "Daan Forest Park",
            "1 Xinsheng S Rd Sec 2",
            "Da'an",
            "central",
            "24 hours",
            "daily",
            "park",
        ),
        attraction(
            "act-012",
            "Bopiliao Historic Block",
            "101 Guangzhou St",
            "Wanhua",
            "west",
            "09:00-18:00",
            "Tue-Sun",
            "historic_site",
        ),
        attraction(
            "act-013",
            "Maokong Gondola",
            "8 Xinguang Rd Sec 2",
            "Wenshan",
            "south",
            "09:00-21:00",
            "Tue-Sun",
            "amusement",
        ),
        attraction(
            "act-014",
            "Dihua Street Shopping",
            "Dihua St Sec 1",
            "Datong",
            "west",
            "10:00-19:00",
            "daily",
            "shopping",
        ),
        attraction(
            "act-015",
            "Songshan Cultural Park",
            "133 Guangfu S Rd",
            "Xinyi",
            "east",
            "08:00-22:00",
            "daily",
            "cultural_center",
        ),
        attraction(
            "act-016",
            "Tamsui Riverside Cycling",
            "Guandu Riverside Path",
            "Beitou",
            "north",
            "24 hours",
            "daily",
            "riverside_cycling",
        ),
        attraction(
            "act-017",
            "Bao'an Temple",
            "61 Hami St",
            "Datong",
            "west",
            "07:00-21:00",
            "daily",
            "temple",
        ),
        attraction(
            "act-018",
            "Ximending Shopping District",
            "Emei St",
            "Wanhua",
            "west",
            "11:00-22:00",
            "daily",
            "shopping",
        ),
        attraction(
            "act-019",
            "Treasure Hill Artist Village",
            "2 Alley 14, Dingzhou Rd Sec 3",
            "Zhongzheng",
            "west",
            "11:00-18:00",
            "Tue-Sun",
            "art_gallery",
        ),
        attraction(
            "act-020",
            "Dadaocheng Wharf",
            "Minsheng W Rd end",
            "Datong",
            "west",
            "10:00-22:00",
            "daily",
            "waterfront",
        ),
    ]
}

/// The demo stand-in for `queryActivities`: flag trait matches against the
/// profile and order them first, preserving catalogue order within each
/// group.
pub fn demo_pool(profile: &TraitProfile) -> Vec<Activity> {
    let mut pool = attractions();
    for activity in &mut pool {
        activity.trait_matched = profile
            .activity_categories
            .iter()
            .any(|category| category.eq_ignore_ascii_case(&activity.category));
    }
    pool.sort_by_key(|activity| !activity.trait_matched);
    pool
}
