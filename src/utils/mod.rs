use rand::distr::Alphanumeric;
use rand::Rng;

/// Sequential names `prefix1..prefixN`, zero padded to the width of `n` so
/// that lexicographic and numeric order agree.
pub fn names0(n: usize, prefix: &str) -> Vec<String> {
    let width = n.to_string().len();
    (1..=n)
        .map(|i| format!("{}{:0width$}", prefix, i, width = width))
        .collect()
}

/// Step identifier of the form `prefix_XXXXX`.
pub fn rand_id(prefix: &str) -> String {
    rand_id_with(prefix, &mut rand::rng())
}

pub fn rand_id_with<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> String {
    let suffix: String = rng
        .sample_iter(&Alphanumeric)
        .take(5)
        .map(char::from)
        .collect();
    format!("{}_{}", prefix, suffix)
}

/// Joins `items` with `", "`, eliding the tail when the text would not fit in
/// `width` characters.
pub fn format_ch_vec(items: &[String], width: usize) -> String {
    const SEP: &str = ", ";
    let adjusted: Vec<usize> = items
        .iter()
        .map(|s| s.chars().count() + SEP.len())
        .collect();

    if adjusted.iter().sum::<usize>() < width {
        return items.join(SEP);
    }

    let mut running = 0;
    let fitting = adjusted
        .iter()
        .take_while(|&&w| {
            running += w;
            running < width
        })
        .count();

    if fitting < 2 {
        return format!("{} items", items.len());
    }
    let mut kept: Vec<&str> = items[..fitting - 1].iter().map(String::as_str).collect();
    kept.push("...");
    kept.join(SEP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_names0_padding() {
        assert_eq!(names0(3, "kPC"), vec!["kPC1", "kPC2", "kPC3"]);

        let nine = names0(9, "P");
        assert_eq!(nine.first().unwrap(), "P1");
        assert_eq!(nine.last().unwrap(), "P9");

        let many = names0(101, "P");
        assert_eq!(many.len(), 101);
        assert_eq!(many[0], "P001");
        assert_eq!(many[9], "P010");
        assert_eq!(many[100], "P101");

        let mut sorted = many.clone();
        sorted.sort();
        assert_eq!(sorted, many);
    }

    #[test]
    fn test_names0_empty() {
        assert!(names0(0, "kPC").is_empty());
    }

    #[test]
    fn test_rand_id() {
        let id = rand_id("kpca");
        assert!(id.starts_with("kpca_"));
        assert_eq!(id.len(), "kpca_".len() + 5);
        assert!(id["kpca_".len()..].chars().all(|c| c.is_ascii_alphanumeric()));

        let a = rand_id_with("kpca", &mut ChaCha8Rng::seed_from_u64(7));
        let b = rand_id_with("kpca", &mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_format_ch_vec() {
        let items: Vec<String> = ["alpha", "beta", "gamma", "delta"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(format_ch_vec(&items, 80), "alpha, beta, gamma, delta");
        // 7 + 6 + 7 = 20 fits under 22, so two names survive before the ellipsis
        assert_eq!(format_ch_vec(&items, 22), "alpha, beta, ...");
        assert_eq!(format_ch_vec(&items, 8), "4 items");
    }
}
