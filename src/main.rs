const USAGE: &str = "Usage: web-ocr <health | recognize <image> [--copy] | paste [--copy]>";

fn main() {
    let action = match web_ocr_lib::AppAction::parse(std::env::args().skip(1)) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    std::process::exit(web_ocr_lib::run(action))
}
