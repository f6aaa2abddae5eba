use std::fmt;
use crate::TopK;

pub fn format(list: &TopK) -> String {
    list.to_string()
}

impl fmt::Display for TopK {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in self.entries() {
            writeln!(f, "{},{}", entry.key, entry.count)?;
        }
        Ok(())
    }
}
