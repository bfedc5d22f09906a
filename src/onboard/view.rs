use crate::setup::{ErrorMap, GENERAL_ERROR_KEY, SetupData, SetupStep};
use crate::ui::style as ui;

/// Steps the operator fills in (database, admin, site).
const FORM_STEPS: usize = 3;

pub fn print_welcome_banner() {
    println!();
    println!("  {}", ui::accent(t!("onboard.banner.title")));
    println!("  {}", ui::header(t!("onboard.banner.welcome")));
    println!("  {}", ui::dim(t!("onboard.banner.subtitle")));
    println!();
}

pub fn print_step(step: SetupStep) {
    println!();
    println!(
        "  {} {}",
        ui::accent(format!("[{}/{FORM_STEPS}]", step.index())),
        ui::header(step.title())
    );
    println!("  {}", ui::dim("─".repeat(50)));
}

pub fn print_bullet(text: &str) {
    println!("  {} {}", ui::accent("›"), text);
}

/// Field errors first, then the general one.
pub fn print_errors(errors: &ErrorMap) {
    for (key, message) in errors.iter().filter(|(k, _)| *k != GENERAL_ERROR_KEY) {
        println!("  {} {} {}", ui::fail_mark(), ui::dim(key), ui::error(message));
    }
    if let Some(general) = errors.get(GENERAL_ERROR_KEY) {
        println!("  {} {}", ui::fail_mark(), ui::error(general));
    }
}

pub fn print_connection_result(success: bool, message: Option<&str>) {
    let message = message.unwrap_or_default();
    if success {
        println!(
            "  {} {} {}",
            ui::ok_mark(),
            t!("onboard.database.connected"),
            ui::dim(message)
        );
    } else {
        println!(
            "  {} {} {}",
            ui::fail_mark(),
            t!("onboard.database.unreachable"),
            ui::error(message)
        );
    }
}

pub fn print_summary(data: &SetupData) {
    println!();
    println!("  {}", ui::header(t!("onboard.summary.title")));
    let rows = [
        (t!("onboard.summary.database"), crate::install::redact_uri(&data.database.uri)),
        (t!("onboard.summary.database_name"), data.database.name.clone()),
        (t!("onboard.summary.admin"), format!("{} <{}>", data.admin.username, data.admin.email)),
        (t!("onboard.summary.site"), data.site.title.clone()),
        (t!("onboard.summary.url"), data.site.url.clone()),
        (
            t!("onboard.summary.locale"),
            format!(
                "{} / {}",
                data.site.language_or_default(),
                data.site.timezone_or_default()
            ),
        ),
    ];
    for (label, value) in rows {
        println!("    › {label} {}", ui::value(value));
    }
    println!();
}

pub fn print_complete(data: &SetupData, message: Option<&str>) {
    println!();
    println!(
        "  {}",
        ui::accent("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    );
    println!("  ◆  {}", ui::header(t!("onboard.complete.title")));
    println!(
        "  {}",
        ui::accent("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    );
    if let Some(message) = message {
        println!("  {}", ui::dim(message));
    }
    println!();
    println!("  {}", ui::header(t!("onboard.complete.next_steps")));
    println!(
        "    {} {}",
        ui::accent("1."),
        t!("onboard.complete.serve")
    );
    println!("       {}", ui::command("modular serve"));
    println!(
        "    {} {}",
        ui::accent("2."),
        t!("onboard.complete.sign_in", user = data.admin.username)
    );
    println!("       {}", ui::url(format!("{}/admin", data.site.url)));
    println!();
}
