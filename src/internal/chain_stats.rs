#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::pedantic)]
#![allow(warnings)]

use plotters::prelude::*;
use rand::Rng;

// Buckets every simulated table starts with
const INITIAL_BUCKETS: usize = 16_384;
// Sweep from 0.1x to 3.0x the initial bucket count in 10 steps
const NUM_STEPS: usize = 10;

// Growth policies to compare
const POLICIES: [&str; 3] = ["No Growth", "Double At 75%", "Double At Full"];

// A stripped-down chaining table: buckets of raw u64 keys, enough to
// observe chain behavior without the full map API.
struct SimTable {
    buckets: Vec<Vec<u64>>,
    count: usize,
}

fn bucket_of(key: u64, buckets: usize) -> usize {
    (key % buckets as u64) as usize
}

impl SimTable {
    fn new() -> Self {
        let mut buckets = Vec::with_capacity(INITIAL_BUCKETS);
        buckets.resize_with(INITIAL_BUCKETS, Vec::new);
        SimTable { buckets, count: 0 }
    }

    fn should_grow(&self, policy: &str) -> bool {
        match policy {
            "No Growth" => false,
            "Double At 75%" => self.count * 4 >= self.buckets.len() * 3,
            "Double At Full" => self.count >= self.buckets.len(),
            _ => panic!("Unknown policy"),
        }
    }

    fn grow(&mut self) {
        let doubled = self.buckets.len() * 2;
        let mut fresh: Vec<Vec<u64>> = Vec::with_capacity(doubled);
        fresh.resize_with(doubled, Vec::new);

        for bucket in std::mem::replace(&mut self.buckets, fresh) {
            for key in bucket {
                let index = bucket_of(key, doubled);
                self.buckets[index].push(key);
            }
        }
    }

    fn insert(&mut self, key: u64, policy: &str) {
        if self.should_grow(policy) {
            self.grow();
        }

        let index = bucket_of(key, self.buckets.len());
        if !self.buckets[index].contains(&key) {
            self.buckets[index].push(key);
            self.count += 1;
        }
    }

    // Expected cost of a successful lookup: the average 1-based position
    // of a stored key within its chain.
    fn average_chain_cost(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let total: usize =
            self.buckets.iter().map(|bucket| bucket.len() * (bucket.len() + 1) / 2).sum();
        total as f64 / self.count as f64
    }

    fn longest_chain(&self) -> usize {
        self.buckets.iter().map(Vec::len).max().unwrap_or(0)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Key counts from 0.1x to 3.0x the initial bucket count
    let key_counts: Vec<usize> = (0..NUM_STEPS)
        .map(|i| {
            let factor = 0.1 + (3.0 - 0.1) * (i as f64) / ((NUM_STEPS - 1) as f64);
            (INITIAL_BUCKETS as f64 * factor) as usize
        })
        .collect();

    println!("Initial buckets: {}", INITIAL_BUCKETS);
    println!("Key counts: {:?}", key_counts);

    // Results storage
    let mut average_cost: Vec<Vec<f64>> = vec![Vec::new(); POLICIES.len()];
    let mut longest_chain: Vec<Vec<usize>> = vec![Vec::new(); POLICIES.len()];
    let mut final_buckets: Vec<Vec<usize>> = vec![Vec::new(); POLICIES.len()];

    // Generate random keys outside the loop to ensure fair comparison
    let mut rng = rand::rng();
    let max_keys_needed = *key_counts.iter().max().unwrap();
    let keys: Vec<u64> = (0..max_keys_needed).map(|_| rng.random_range(1..u64::MAX)).collect();

    // Running experiments
    for &n_keys in &key_counts {
        println!("Testing with {} keys", n_keys);

        for (policy_idx, &policy) in POLICIES.iter().enumerate() {
            let mut table = SimTable::new();
            for &key in keys.iter().take(n_keys) {
                table.insert(key, policy);
            }

            let avg = table.average_chain_cost();
            let worst = table.longest_chain();
            let buckets = table.buckets.len();

            average_cost[policy_idx].push(avg);
            longest_chain[policy_idx].push(worst);
            final_buckets[policy_idx].push(buckets);

            println!(
                "  {}: Avg chain cost = {:.2}, Longest = {}, Buckets = {}",
                policy, avg, worst, buckets
            );
        }
    }

    let font_family = "sans-serif";
    let colors = [
        RGBColor(220, 50, 50), // Bright red
        RGBColor(50, 90, 220), // Bright blue
        RGBColor(50, 180, 50), // Bright green
    ];
    let line_width = 2;
    let marker_size = 4;
    let text_size = 16;
    let title_size = 35;

    // Custom x-axis labels showing the key counts
    let x_labels: Vec<String> = key_counts.iter().map(|&n| n.to_string()).collect();

    // Plot 1: Average chain cost
    let root = BitMapBackend::new("average_chain_cost.png", (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_avg = average_cost
        .iter()
        .flat_map(|v| v.iter())
        .fold(0.0, |max, &x| if x > max { x } else { max }) *
        1.1; // Add 10% margin

    let mut chart = ChartBuilder::on(&root)
        .caption("Successful Lookup Cost by Growth Policy", (font_family, title_size))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .right_y_label_area_size(10)
        .build_cartesian_2d(0..(key_counts.len() - 1), 0.0..max_avg)?;

    chart
        .configure_mesh()
        .x_labels(key_counts.len() - 1)
        .x_label_formatter(&|x| {
            if *x < x_labels.len() { x_labels[*x].clone() } else { "".to_string() }
        })
        .x_desc("Number of Keys Inserted")
        .y_desc("Average Chain Positions Scanned")
        .axis_desc_style((font_family, text_size))
        .draw()?;

    // Mark the point where the key count passes the initial bucket count:
    // beyond it the no-growth table can only get worse.
    let full_idx = key_counts.iter().position(|&n| n >= INITIAL_BUCKETS);
    if let Some(full_idx) = full_idx {
        if full_idx < key_counts.len() - 1 {
            let reference_style = ShapeStyle::from(&BLACK.mix(0.3)).stroke_width(1);
            chart
                .draw_series(LineSeries::new(
                    vec![(full_idx, 0.0), (full_idx, max_avg)],
                    reference_style,
                ))?
                .label("Keys = Initial Buckets")
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], reference_style)
                });
        }
    }

    for (policy_idx, &policy) in POLICIES.iter().enumerate() {
        let color = &colors[policy_idx % colors.len()];
        let line_style = ShapeStyle::from(color).stroke_width(line_width);

        chart
            .draw_series(LineSeries::new(
                (0..key_counts.len() - 1).map(|i| (i, average_cost[policy_idx][i])),
                line_style,
            ))?
            .label(policy)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));

        chart.draw_series((0..key_counts.len() - 1).map(|i| {
            Circle::new((i, average_cost[policy_idx][i]), marker_size, color.filled())
        }))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    // Plot 2: Longest chain
    let root = BitMapBackend::new("longest_chain.png", (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_worst = longest_chain
        .iter()
        .flat_map(|v| v.iter())
        .fold(0, |max, &x| if x > max { x } else { max }) as f64 *
        1.1; // Add 10% margin

    let mut chart = ChartBuilder::on(&root)
        .caption("Longest Collision Chain by Growth Policy", (font_family, title_size))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .right_y_label_area_size(10)
        .build_cartesian_2d(0..(key_counts.len() - 1), 0.0..max_worst)?;

    chart
        .configure_mesh()
        .x_labels(key_counts.len() - 1)
        .x_label_formatter(&|x| {
            if *x < x_labels.len() { x_labels[*x].clone() } else { "".to_string() }
        })
        .x_desc("Number of Keys Inserted")
        .y_desc("Longest Chain (entries)")
        .axis_desc_style((font_family, text_size))
        .draw()?;

    for (policy_idx, &policy) in POLICIES.iter().enumerate() {
        let color = &colors[policy_idx % colors.len()];
        let line_style = ShapeStyle::from(color).stroke_width(line_width);

        chart
            .draw_series(LineSeries::new(
                (0..key_counts.len() - 1).map(|i| (i, longest_chain[policy_idx][i] as f64)),
                line_style,
            ))?
            .label(policy)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));

        chart.draw_series((0..key_counts.len() - 1).map(|i| {
            Circle::new((i, longest_chain[policy_idx][i] as f64), marker_size, color.filled())
        }))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    // Bucket counts are only printed: they differ by orders of magnitude
    // between policies, which makes a shared linear axis unreadable.
    for (policy_idx, &policy) in POLICIES.iter().enumerate() {
        println!("{} final bucket counts: {:?}", policy, final_buckets[policy_idx]);
    }

    println!("Generated plot images: average_chain_cost.png, longest_chain.png");

    Ok(())
}
