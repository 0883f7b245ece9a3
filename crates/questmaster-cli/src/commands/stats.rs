use questmaster_core::Config;

use super::open_session;

pub fn run(json: bool, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_session(config)?;
    let stats = app.tick();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    println!("Quests:          {}", stats.total_tasks);
    println!("Completed today: {}", stats.completed_today);
    println!("Urgent:          {}", stats.urgent);
    println!("Overdue:         {}", stats.overdue);
    println!("Today progress:  {}%", stats.today_progress);
    println!("Score:           {}", stats.score);
    println!("Level:           {}", stats.level);
    println!("Coins:           {}", stats.coins);
    println!("Streak:          {} day(s)", stats.streak);
    Ok(())
}

pub fn achievements(json: bool, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let app = open_session(config)?;
    let achievements = app.achievements();

    if json {
        println!("{}", serde_json::to_string_pretty(achievements)?);
        return Ok(());
    }
    for achievement in achievements {
        let mark = if achievement.unlocked { "x" } else { " " };
        println!(
            "[{mark}] {:<16} {:>4} coins  {}",
            achievement.name, achievement.coin_reward, achievement.description
        );
    }
    Ok(())
}
