//! `tripweaver profiles` — print the personality catalogue.

use tripweaver_core::TraitProfile;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Personality profiles ({}):\n", TraitProfile::all_codes().len());
    for code in TraitProfile::all_codes() {
        let profile = TraitProfile::resolve(code)?;
        println!("  {code}");
        println!("    activities: {}", profile.activity_categories.join(", "));
        println!("    dining:     {}", profile.provision_categories.join(", "));
    }
    Ok(())
}
