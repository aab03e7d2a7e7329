mod test_comparison;
