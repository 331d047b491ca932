use colorful::{Colorful, RGB};

use crate::models::{ChannelOutcome, ChannelStats, Stats};

struct Palette {
    primary: RGB,
    secondary: RGB,
    success: RGB,
    warning: RGB,
    info: RGB,
    subtle: RGB,
}

fn palette() -> Palette {
    Palette {
        primary: RGB::new(79, 70, 229),    // Indigo
        secondary: RGB::new(236, 72, 153), // Pink
        success: RGB::new(16, 185, 129),   // Emerald
        warning: RGB::new(245, 158, 11),   // Amber
        info: RGB::new(59, 130, 246),      // Blue
        subtle: RGB::new(107, 114, 128),   // Gray
    }
}

/// Summary printed after `pairs`.
pub fn print_pair_stats(stats: &Stats) {
    let Palette { primary, secondary, success, warning, info, subtle } = palette();
    println!("\n  📊 Pairing Statistics:");
    println!("     ├─ ⏱️  Time: {:.2?}", stats.start_time.elapsed());
    println!("     ├─ 📂 Channels: {}", stats.channels_processed.to_string().color(info));
    println!("     ├─ 📨 Messages: {}", stats.total_messages.to_string().color(success));
    println!("     ├─ 🙋 Yours: {}", stats.total_target_messages.to_string().color(success));
    println!("     ├─ 💬 Bursts: {}", stats.total_bursts.to_string().color(primary));
    println!(
        "     ├─ 🗣️  Pairs: {} ({} explicit replies)",
        stats.total_pairs.to_string().color(secondary),
        stats.total_explicit.to_string().color(secondary)
    );
    if let Ok(metadata) = std::fs::metadata(&stats.output_path) {
        println!(
            "     ├─ 📁 File Size: {} MB",
            format!("{:.2}", metadata.len() as f64 / 1_000_000.0).color(warning)
        );
    }
    println!("     └─ 💾 Output: {}", stats.output_path.clone().color(subtle));

    let mut channels: Vec<_> = stats.channel_stats.iter().filter(|c| c.pairs_found > 0).collect();
    channels.sort_by(|a, b| b.pairs_found.cmp(&a.pairs_found).then_with(|| a.name.cmp(&b.name)));
    if channels.is_empty() {
        return;
    }

    println!("\n  📋 Per-channel breakdown:");
    for channel in channels {
        let rate = channel
            .pair_rate()
            .map(|r| format!("{:.1}%", r))
            .unwrap_or_default();
        println!(
            "     ├─ {} ({} msgs, {} bursts, {} pairs, {})",
            channel.name.clone().color(info),
            channel.messages_processed,
            channel.bursts_found,
            channel.pairs_found.to_string().color(secondary),
            rate.color(subtle)
        );
    }
}

/// Summary printed after `dump`.
pub fn print_collect_stats(results: &[(ChannelOutcome, ChannelStats)], interrupted: bool) {
    let Palette { secondary, success, warning, info, subtle, .. } = palette();
    println!("\n  📋 Collected channels:");
    for (outcome, channel) in results {
        let status = match outcome {
            ChannelOutcome::Saved => "saved".color(success),
            ChannelOutcome::Empty => "empty".color(subtle),
            ChannelOutcome::NoAccess => "no access".color(subtle),
            ChannelOutcome::Interrupted => "interrupted".color(warning),
        };
        println!(
            "     ├─ #{} {} ({} msgs, {} yours, {:.2?})",
            channel.name.clone().color(info),
            status,
            channel.messages_processed,
            channel.target_messages,
            channel.time_taken
        );
    }

    let saved = results
        .iter()
        .filter(|(o, _)| *o == ChannelOutcome::Saved)
        .count();
    let messages: usize = results.iter().map(|(_, c)| c.messages_processed).sum();
    println!(
        "     └─ 💾 {} channels saved, {} messages",
        saved.to_string().color(secondary),
        messages.to_string().color(success)
    );

    if interrupted {
        let msg = "⚠️  Interrupted, but finished channels were saved."
            .color(RGB::new(231, 76, 60))
            .to_string();
        println!("\n  {}\n", msg);
    }
}
