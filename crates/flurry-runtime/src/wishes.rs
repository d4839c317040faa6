//! The fixed pool of wishes revealed after the sleigh reaches the treetop

use flurry_particles::rand::ParticleRng;

pub const WISHES: [&str; 9] = [
    "Chúc bạn Giáng Sinh này bớt \"overthinking\",\nbớt \"deadline\"\nvà có thêm thật nhiều \"money\" để đi du dưa",
    "Giáng Sinh này chúc bạn\nsớm thoát kiếp làm \"cây thông\",\nđứng nhìn người ta nắm tay.\nCố lên bạn tôi!",
    "Merry Christmas!\nChúc bạn nhận được món quà mình thích,\ngặp được người mình thương\nvà luôn là phiên bản hạnh phúc nhất của chính mình",
    "All I want for Christmas is you…\nand a big bank account",
    "May your heart be light\nand your days be bright.\nGiáng Sinh rạng rỡ nhé!",
    "Giáng Sinh:\nmột chút lung linh,\nmột chút ấm áp,\nvà thật nhiều yêu thương",
    "Stay cozy and merry.\nMong bạn có một đêm Giáng Sinh\nthật trọn vẹn bên những người quan trọng nhất",
    "Giáng Sinh này mặc gì cũng được,\nmiễn là không phải mắc kẹt\nmột mình giữa phố đông",
    "Noel ngoài trời có tuyết,\ntheo đúng giả thuyết\nthì anh phải yêu em",
];

#[derive(Debug, Clone)]
pub struct WishPool {
    lines: Vec<String>,
}

impl Default for WishPool {
    fn default() -> Self {
        Self::new(WISHES.iter().map(|s| s.to_string()).collect())
    }
}

impl WishPool {
    /// Pool of the given lines; blank lines are dropped and an empty pool
    /// falls back to the built-in wishes.
    pub fn new(lines: Vec<String>) -> Self {
        let lines: Vec<String> = lines.into_iter().filter(|l| !l.trim().is_empty()).collect();
        if lines.is_empty() {
            return Self::default();
        }
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// A uniformly random wish
    pub fn pick(&self, rng: &mut ParticleRng) -> &str {
        rng.index(self.lines.len())
            .and_then(|i| self.lines.get(i))
            .map(String::as_str)
            .unwrap_or(WISHES[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pool_has_nine_wishes() {
        let pool = WishPool::default();
        assert_eq!(pool.len(), 9);
        assert!(pool.lines().iter().all(|w| !w.is_empty()));
    }

    #[test]
    fn picks_come_from_the_pool() {
        let pool = WishPool::default();
        let mut rng = ParticleRng::new(4);
        for _ in 0..50 {
            let w = pool.pick(&mut rng);
            assert!(WISHES.contains(&w));
        }
    }

    #[test]
    fn blank_custom_pool_falls_back() {
        let pool = WishPool::new(vec!["  ".into(), String::new()]);
        assert_eq!(pool.len(), 9);
        let custom = WishPool::new(vec!["Ho ho ho".into()]);
        assert_eq!(custom.pick(&mut ParticleRng::new(1)), "Ho ho ho");
    }
}
