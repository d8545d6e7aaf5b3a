mod cli;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    // 終了コードは0か1だけ（--help や引数エラーも含めて、実行しなかった場合は1）
    let opts = match cli::Options::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    match opts.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // perror(3) と同じく「ステップ名: OSのエラー文」だけを出す
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
