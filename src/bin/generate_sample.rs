use product_lens::data::translate::BUILTIN_TRANSLATIONS;

/// SplitMix64: one word of state, enough for reproducible sample data.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    fn index(&mut self, len: usize) -> usize {
        (self.next() % len.max(1) as u64) as usize
    }

    /// Normal sample via the Marsaglia polar method.
    fn normal(&mut self, mean: f64, sd: f64) -> f64 {
        loop {
            let u = 2.0 * self.unit() - 1.0;
            let v = 2.0 * self.unit() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                return mean + sd * u * (-2.0 * s.ln() / s).sqrt();
            }
        }
    }
}

const HEADER: [&str; 9] = [
    "product_id",
    "product_category_name",
    "product_name_lenght",
    "product_description_lenght",
    "product_photos_qty",
    "product_weight_g",
    "product_length_cm",
    "product_height_cm",
    "product_width_cm",
];

fn main() {
    let mut rng = Rng(42);
    let n_products = 2_000;

    // A skewed subset of categories plus one label without a translation.
    let mut categories: Vec<&str> = BUILTIN_TRANSLATIONS
        .iter()
        .take(24)
        .map(|(original, _)| *original)
        .collect();
    categories.push("categoria_sem_traducao");

    let output_path = "cleaned_products_data.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");
    writer.write_record(HEADER).expect("Failed to write header");

    for id in 0..n_products {
        // Squaring biases picks toward the front of the list.
        let pick = rng.unit().powi(2);
        let category = if rng.unit() < 0.02 {
            String::new()
        } else {
            categories[(pick * categories.len() as f64) as usize % categories.len()].to_string()
        };

        let length = rng.normal(30.0, 12.0).clamp(7.0, 105.0);
        let height = rng.normal(17.0, 10.0).clamp(2.0, 105.0);
        let width = rng.normal(23.0, 9.0).clamp(6.0, 118.0);
        // Weight tracks volume so the correlation matrix has structure.
        let volume = length * height * width;
        let weight = (volume * 0.18 + rng.normal(0.0, 300.0)).clamp(50.0, 40_000.0).round();
        let photos = 1 + rng.index(6);

        let record = [
            format!("p{id:06}"),
            category,
            format!("{:.0}", rng.normal(48.0, 10.0).clamp(5.0, 76.0)),
            format!("{:.0}", rng.normal(780.0, 600.0).clamp(4.0, 3992.0)),
            photos.to_string(),
            format!("{weight:.0}"),
            format!("{length:.0}"),
            format!("{height:.0}"),
            format!("{width:.0}"),
        ];
        writer.write_record(&record).expect("Failed to write row");
    }

    writer.flush().expect("Failed to flush output");
    println!("Wrote {n_products} products to {output_path}");
}
