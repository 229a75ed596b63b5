use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

use usage_health::data::model::fields;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

#[derive(Serialize)]
struct Row {
    #[serde(rename = "User_ID")]
    user_id: i64,
    #[serde(rename = "Age")]
    age: Option<i64>,
    #[serde(rename = "Gender")]
    gender: Option<&'static str>,
    #[serde(rename = "Country")]
    country: &'static str,
    #[serde(rename = "Income_USD")]
    income: f64,
    #[serde(rename = "Daily_Screen_Time_Hours")]
    screen_time: f64,
    #[serde(rename = "Social_Media_Usage_Hours")]
    social_media: f64,
    #[serde(rename = "Gaming_Usage_Hours")]
    gaming: f64,
    #[serde(rename = "Streaming_Usage_Hours")]
    streaming: f64,
    #[serde(rename = "Messaging_Usage_Hours")]
    messaging: f64,
    #[serde(rename = "Work_Related_Usage_Hours")]
    work: f64,
    #[serde(rename = "Sleep_Hours")]
    sleep: f64,
    #[serde(rename = "Physical_Activity_Hours")]
    physical_activity: f64,
    #[serde(rename = "Time_Spent_With_Family_Hours")]
    family_time: f64,
    #[serde(rename = "Online_Shopping_Hours")]
    online_shopping: f64,
    #[serde(rename = "Phone_Unlocks_Per_Day")]
    phone_unlocks: i64,
    #[serde(rename = "Push_Notifications_Per_Day")]
    notifications: i64,
    #[serde(rename = "Has_Night_Mode_On")]
    night_mode: bool,
    #[serde(rename = "Mental_Health_Score")]
    mental_health: f64,
    #[serde(rename = "Depression_Score")]
    depression: f64,
    #[serde(rename = "Anxiety_Score")]
    anxiety: f64,
    #[serde(rename = "Stress_Level")]
    stress: Option<f64>,
    #[serde(rename = "Self_Reported_Addiction_Level")]
    addiction_level: &'static str,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn generate(rng: &mut SimpleRng, n: i64) -> Vec<Row> {
    let countries = [
        "India", "USA", "Brazil", "Germany", "Turkey", "Japan", "Nigeria", "Mexico", "France",
        "Indonesia", "Canada", "Egypt",
    ];
    let genders = ["Female", "Male", "Other"];

    (0..n)
        .map(|user_id| {
            let screen_time = rng.gauss(6.0, 2.5).clamp(0.5, 16.0);
            let social_media = (screen_time * 0.4 + rng.gauss(0.0, 0.8)).max(0.0);
            let addiction = screen_time / 4.0 + rng.gauss(0.0, 0.6);
            let addiction_level = match addiction {
                a if a < 1.2 => "Low",
                a if a < 1.8 => "Moderate",
                a if a < 2.5 => "High",
                _ => "Severe",
            };

            // Occasional negative readings exercise the clamping in cleaning.
            let sleep = if rng.chance(0.02) {
                -rng.next_f64() * 2.0
            } else {
                rng.gauss(8.5 - screen_time * 0.25, 0.8).clamp(3.0, 11.0)
            };
            let mental_health = (80.0 - social_media * 6.0 + rng.gauss(0.0, 8.0)).clamp(0.0, 100.0);

            Row {
                user_id,
                age: (!rng.chance(0.01)).then(|| 13 + (rng.next_u64() % 53) as i64),
                gender: (!rng.chance(0.01)).then(|| rng.pick(&genders)),
                country: rng.pick(&countries),
                income: round1(rng.gauss(30_000.0, 12_000.0).max(0.0)),
                screen_time: round1(screen_time),
                social_media: round1(social_media),
                gaming: round1(rng.gauss(1.0, 0.8)),
                streaming: round1(rng.gauss(1.5, 0.7).max(0.0)),
                messaging: round1(rng.gauss(1.0, 0.5).max(0.0)),
                work: round1(rng.gauss(2.0, 1.2).max(0.0)),
                sleep: round1(sleep),
                physical_activity: round1(rng.gauss(1.0, 0.6)),
                family_time: round1(rng.gauss(2.0, 1.0).max(0.0)),
                online_shopping: round1(rng.gauss(0.5, 0.4)),
                phone_unlocks: (screen_time * 12.0 + rng.gauss(0.0, 15.0)).max(5.0) as i64,
                notifications: (rng.gauss(90.0, 40.0)).max(0.0) as i64,
                night_mode: rng.chance(0.45),
                mental_health: round1(mental_health),
                depression: round1((100.0 - mental_health) / 10.0 + rng.gauss(0.0, 1.0)).max(0.0),
                anxiety: round1((100.0 - mental_health) / 12.0 + rng.gauss(0.0, 1.2)).max(0.0),
                stress: (!rng.chance(0.01))
                    .then(|| round1((screen_time * 0.6 + rng.gauss(2.0, 1.5)).clamp(1.0, 10.0))),
                addiction_level,
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let f64_col = |name: &str, get: fn(&Row) -> f64| -> (Field, ArrayRef) {
        (
            Field::new(name, DataType::Float64, false),
            Arc::new(Float64Array::from(rows.iter().map(get).collect::<Vec<_>>())),
        )
    };
    let i64_col = |name: &str, get: fn(&Row) -> i64| -> (Field, ArrayRef) {
        (
            Field::new(name, DataType::Int64, false),
            Arc::new(Int64Array::from(rows.iter().map(get).collect::<Vec<_>>())),
        )
    };

    let columns: Vec<(Field, ArrayRef)> = vec![
        i64_col("User_ID", |r| r.user_id),
        (
            Field::new(fields::AGE, DataType::Int64, true),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.age).collect::<Vec<_>>())),
        ),
        (
            Field::new(fields::GENDER, DataType::Utf8, true),
            Arc::new(StringArray::from(rows.iter().map(|r| r.gender).collect::<Vec<_>>())),
        ),
        (
            Field::new(fields::COUNTRY, DataType::Utf8, false),
            Arc::new(StringArray::from(rows.iter().map(|r| r.country).collect::<Vec<_>>())),
        ),
        f64_col(fields::INCOME, |r| r.income),
        f64_col(fields::SCREEN_TIME, |r| r.screen_time),
        f64_col(fields::SOCIAL_MEDIA, |r| r.social_media),
        f64_col(fields::GAMING, |r| r.gaming),
        f64_col(fields::STREAMING, |r| r.streaming),
        f64_col(fields::MESSAGING, |r| r.messaging),
        f64_col(fields::WORK, |r| r.work),
        f64_col(fields::SLEEP, |r| r.sleep),
        f64_col(fields::PHYSICAL_ACTIVITY, |r| r.physical_activity),
        f64_col(fields::FAMILY_TIME, |r| r.family_time),
        f64_col(fields::ONLINE_SHOPPING, |r| r.online_shopping),
        i64_col(fields::PHONE_UNLOCKS, |r| r.phone_unlocks),
        i64_col(fields::NOTIFICATIONS, |r| r.notifications),
        (
            Field::new(fields::NIGHT_MODE, DataType::Boolean, false),
            Arc::new(BooleanArray::from(rows.iter().map(|r| r.night_mode).collect::<Vec<_>>())),
        ),
        f64_col(fields::MENTAL_HEALTH, |r| r.mental_health),
        f64_col(fields::DEPRESSION, |r| r.depression),
        f64_col(fields::ANXIETY, |r| r.anxiety),
        (
            Field::new(fields::STRESS, DataType::Float64, true),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.stress).collect::<Vec<_>>())),
        ),
        (
            Field::new(fields::ADDICTION_LEVEL, DataType::Utf8, false),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.addiction_level).collect::<Vec<_>>(),
            )),
        ),
    ];

    let (schema_fields, arrays): (Vec<Field>, Vec<ArrayRef>) = columns.into_iter().unzip();
    let schema = Arc::new(Schema::new(schema_fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng, 3000);

    let csv_path = Path::new("mobile_addiction_data.csv");
    let parquet_path = Path::new("mobile_addiction_data.parquet");
    write_csv(csv_path, &rows)?;
    write_parquet(parquet_path, &rows)?;

    println!(
        "Wrote {} records to {} and {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
