use anyhow::Result;

use scrollto_core::EasingName;

pub fn run() -> Result<()> {
    println!("Easing curves ({}):\n", EasingName::ALL.len());

    for easing in EasingName::ALL {
        let marker = if easing == EasingName::default() {
            " (default)"
        } else {
            ""
        };
        println!("  {}{}", easing, marker);
    }

    Ok(())
}
