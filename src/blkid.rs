use crate::checker::CheckResult;
use crate::provider::DataProvider;

/// Checks that the `name` block device exists and, when `disktype` is given,
/// that its reported filesystem type contains it.
pub fn blkid(provider: &dyn DataProvider, name: &str, disktype: Option<&str>) -> CheckResult {
    let mut devices = match provider.blkid() {
        Ok(devices) => devices,
        Err(e) => {
            return CheckResult::failure(name, format!("failed to gather block device ids: {}", e))
        }
    };
    let record = match devices.remove(name) {
        Some(record) => record,
        None => return CheckResult::failure(name, format!("named disk not present: {}", name)),
    };
    let wanted = match disktype.filter(|t| !t.is_empty()) {
        Some(t) => t,
        None => return CheckResult::success(name, "", Some(record)),
    };
    // TYPE may hold a single type or a list of them
    let found = record
        .get("TYPE")
        .map(|t| t.contains(wanted))
        .unwrap_or(false);
    if found {
        CheckResult::success(name, format!("your {} type has been found", wanted), Some(record))
    } else {
        CheckResult::failure(name, format!("your {} type has not been found", wanted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticProvider;

    fn provider() -> StaticProvider {
        StaticProvider::new()
            .with_blkid("/dev/sda1", &[("TYPE", "zfs"), ("UUID", "1234-abcd")])
            .with_blkid("/dev/sdb1", &[("TYPE", "ext4,ext3")])
            .with_blkid("/dev/loop0", &[("UUID", "no-type")])
    }

    #[test]
    fn matching_type_succeeds() {
        let result = blkid(&provider(), "/dev/sda1", Some("zfs"));
        assert!(result.result);
        assert!(result.comment.contains("has been found"));
        let data = result.data.unwrap();
        assert_eq!(data.get("UUID").map(String::as_str), Some("1234-abcd"));
    }

    #[test]
    fn other_type_fails() {
        let result = blkid(&provider(), "/dev/sda1", Some("ext4"));
        assert!(!result.result);
        assert_eq!(result.comment, "your ext4 type has not been found");
        assert!(result.data.is_none());
    }

    #[test]
    fn type_may_appear_within_a_list() {
        assert!(blkid(&provider(), "/dev/sdb1", Some("ext3")).result);
        assert!(blkid(&provider(), "/dev/sdb1", Some("ext4")).result);
        assert!(!blkid(&provider(), "/dev/sdb1", Some("xfs")).result);
    }

    #[test]
    fn missing_type_field_fails() {
        assert!(!blkid(&provider(), "/dev/loop0", Some("ext4")).result);
    }

    #[test]
    fn present_device_without_disktype_succeeds_silently() {
        let result = blkid(&provider(), "/dev/sda1", None);
        assert!(result.result);
        assert!(result.comment.is_empty());
    }

    #[test]
    fn missing_device_fails_regardless_of_disktype() {
        for disktype in [None, Some("zfs")] {
            let result = blkid(&provider(), "/dev/missing", disktype);
            assert!(!result.result);
            assert!(result.comment.contains("not present"));
        }
    }

    #[test]
    fn empty_disktype_is_treated_as_unset() {
        let result = blkid(&provider(), "/dev/sda1", Some(""));
        assert!(result.result);
        assert!(result.comment.is_empty());
        assert!(!blkid(&provider(), "/dev/missing", Some("")).result);
    }
}
