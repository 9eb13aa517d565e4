use tweetrank::{Limit, RankedSequence};

fn main() {
    // Each call counts one occurrence; the ranking reorders itself as counts
    // change, so there is never a sort step before reporting.
    let mut ranking = RankedSequence::new();

    for name in ["alice", "bob", "alice", "carol", "alice", "bob", ""] {
        ranking
            .record_occurrence(tweetrank::normalize_key(name))
            .expect("allocation failed");
    }

    // Print the items and their counts in order of frequency
    println!("Top tweeters:");
    for tally in ranking.top_n(10) {
        println!("{}: {}", tally.key, tally.count);
    }

    // Demonstrate the count() method
    let name = "bob";
    println!("\nCount for '{}': {:?}", name, ranking.count(name));

    // Everything, including the empty-name bucket
    println!("\nAll {} names:", ranking.len());
    for tally in ranking.select(Limit::All) {
        println!("{}: {}", tally.key, tally.count);
    }
}
