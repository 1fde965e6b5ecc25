#[derive(Debug, Clone, Copy)]
pub struct OrderPrice(i32);

impl OrderPrice {
    pub fn parse(price: i32) -> std::result::Result<OrderPrice, String> {
        if price < 0 {
            Err(format!("{} is not a valid order price.", price))
        } else {
            Ok(Self(price))
        }
    }

    pub fn get(&self) -> i32 {
        self.0
    }
}
