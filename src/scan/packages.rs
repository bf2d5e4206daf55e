use std::ffi::OsStr;
use std::process::Command;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::{PackageStatus, ScanState, View};
use crate::error::Error;
use crate::model::SizedEntry;

pub const DEFAULT_PROGRAM: &str = "dpkg-query";

// The long option is used since --showformat only gained its short form in dpkg 1.13.1
const SHOW_FORMAT: &str = "--showformat=${Installed-Size},${Package}\n";

/// `${Installed-Size}` is an estimate in KiB.
pub const KIB: u64 = 1024;

/// Runs the package query and ranks every installed package.
///
/// Failing to run the tool and getting output that breaks the `<kib>,<name>` format
/// both mark the package list unavailable; nothing is inserted in either case.
pub fn list_packages(state: &ScanState) -> Result<usize, Error> {
    let start = Instant::now();

    let parsed = query_installed_sizes(state.package_program())
        .and_then(|output| parse_installed_sizes(&output));
    let packages = match parsed {
        Ok(packages) => packages,
        Err(err) => {
            warn!("Package query failed: {}", err);
            state.set_package_status(PackageStatus::Unavailable(err.to_string()));
            return Err(err);
        }
    };

    let count = packages.len();
    for package in packages {
        state.try_insert(View::Packages, package);
    }
    state.set_package_status(PackageStatus::Ready);

    info!(
        "Listed {} packages in {:.2}s",
        count,
        start.elapsed().as_secs_f64()
    );
    Ok(count)
}

/// Invokes `program --show --showformat=...` and returns its stdout.
pub fn query_installed_sizes(program: &OsStr) -> Result<String, Error> {
    debug!("Running {:?} --show", program);
    let output = Command::new(program)
        .arg("--show")
        .arg(SHOW_FORMAT)
        .output()
        .map_err(|err| {
            Error::PackageQueryUnavailable(format!("cannot run {:?}: {}", program, err))
        })?;

    if !output.status.success() {
        return Err(Error::PackageQueryUnavailable(format!(
            "{:?} exited with {}",
            program, output.status
        )));
    }

    String::from_utf8(output.stdout).map_err(|err| Error::PackageParse {
        line: 0,
        reason: format!("output is not UTF-8: {}", err),
    })
}

/// Parses newline-terminated `<installed-size-kib>,<package-name>` records.
///
/// Any malformed record fails the whole parse. A trailing fragment without a newline is
/// not a record and is ignored.
pub fn parse_installed_sizes(output: &str) -> Result<Vec<SizedEntry>, Error> {
    let mut records: Vec<&str> = output.split('\n').collect();
    records.pop();

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| parse_record(index + 1, record))
        .collect()
}

fn parse_record(line: usize, record: &str) -> Result<SizedEntry, Error> {
    let fields: Vec<&str> = record.split(',').collect();
    let [size, name] = fields[..] else {
        return Err(Error::PackageParse {
            line,
            reason: format!("expected 2 comma separated fields, got {}", fields.len()),
        });
    };

    let kib: u64 = size.parse().map_err(|_| Error::PackageParse {
        line,
        reason: format!("non-number estimated size {:?}", size),
    })?;
    let bytes = kib.checked_mul(KIB).ok_or_else(|| Error::PackageParse {
        line,
        reason: format!("estimated size {} KiB is out of range", kib),
    })?;

    Ok(SizedEntry::new(name, bytes))
}
