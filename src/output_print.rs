use crate::output::{Outputs, Report};

pub struct PrintOutput;

impl PrintOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PrintOutput {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render(report: &Report) -> String {
    let result = &report.result;
    let mut text = format!(
        "ID: {}\n    Name: {}\n  Result: {}\n Comment: {}\n Changes: {:?}\n",
        report.id, result.name, result.result, result.comment, result.changes
    );
    if let Some(data) = &result.data {
        text += "    Data:\n";
        for (key, value) in data {
            text += &format!("        {}: {}\n", key, value);
        }
    }
    text
}

impl Outputs for PrintOutput {
    fn process_result(&mut self, report: &Report) {
        println!("{}", render(report));
    }
}
